use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BenchplotError {
    #[error("file load failed: {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("file load failed: {path}: line {line}: {detail}")]
    FileParse {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {detail}")]
    ConfigParse { path: PathBuf, detail: String },

    #[error("Unknown placeholder '{{{name}}}' in path template. Supported: {{lang}}, {{prog}}, {{size}}, {{col}}")]
    UnknownPlaceholder { name: String },

    #[error("Path {path} does not follow <lang>/release/<prog>/<size>_<col>.txt")]
    UnrecognizedPath { path: PathBuf },

    #[error("No result files to load. Check the languages/programs/sizes/collisions lists")]
    NoDescriptors,

    #[error("Column '{name}' not found. Available: {available}")]
    MissingColumn { name: String, available: String },

    #[error("Unsupported output file {path}. Use a .svg or .png extension")]
    UnsupportedOutput { path: PathBuf },

    #[error("Failed to render plot to {path}: {detail}")]
    Render { path: PathBuf, detail: String },

    #[error("Viewer '{viewer}' failed for {path}: {detail}")]
    ViewerFailed {
        viewer: String,
        path: PathBuf,
        detail: String,
    },
}
