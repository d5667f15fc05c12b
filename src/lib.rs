mod error;
mod matting;
#[cfg(test)]
mod test_utils;
mod utils;

use image::{ImageBuffer, Pixel};

pub use error::{
    CatalogError, CompositeError, ConfigError, GeometryError, ResizeError, SampleError,
    TrimapToolError,
};
pub use matting::catalog::{
    is_supported_image, list_image_files, BackgroundPool, Catalog, PairedSources,
    SampleDescriptor,
};
pub use matting::composite::{
    composite_for_crop, first_channel, upsampled_size, AlphaBlendExt, Composite,
};
pub use matting::config::{CropSize, CropSpecList, DatasetLayout, PipelineConfig};
pub use matting::dataset::MattingDataset;
pub use matting::dilate::{DilateExt, StructuringElement};
pub use matting::geometry::{
    CropWindow, GeometryTransform, RasterOps, RasterQuintet, TransformRecord,
};
pub use matting::gradient::{GradientMap, SobelGradientExt};
pub use matting::inter_linear::{InterLinearResize, ResizeLinearExt};
pub use matting::pipeline::{offline_upsampled_size, worker_rng, SamplePipeline};
pub use matting::sample::{
    luma_to_chw, rgb_to_chw, AssembledRasters, MattingSample, Provenance, RasterShape,
    SourcePaths,
};
pub use matting::trimap::{
    Trimap, TrimapGenerator, TrimapParams, TRIMAP_BACKGROUND, TRIMAP_FOREGROUND, TRIMAP_UNKNOWN,
};
pub use matting::trimap_tool::generate_trimap_directory;

pub type Image<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;
