pub const SEETAFACE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const SEETAFACE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

pub const DEFAULT_MIN_FACE_SIZE: u32 = 40;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];
