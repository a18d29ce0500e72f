pub mod paths;

pub use paths::{
    absolutize, ensure_directory, ensure_input_files, image_basename, parent_or_cwd,
    resolve_output,
};
