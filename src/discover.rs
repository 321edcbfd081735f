use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use crate::config::Config;
use crate::errors::BenchplotError;
use crate::types::Descriptor;

/// Build one descriptor per (language, program, size, collision) combination.
///
/// Language is the outermost loop and collision the innermost. Every
/// combination is emitted exactly once in that nested-loop order; nothing is
/// deduplicated or checked against the filesystem.
pub fn enumerate_descriptors(config: &Config) -> Result<Vec<Descriptor>> {
    let capacity = config.languages.len()
        * config.programs.len()
        * config.sizes.len()
        * config.collisions.len();
    let mut descriptors = Vec::with_capacity(capacity);

    for lang in &config.languages {
        for prog in &config.programs {
            for size in &config.sizes {
                for col in &config.collisions {
                    let path = render_path(&config.path_template, lang, prog, size, col)?;
                    debug!(path = %path.display(), "enumerated");
                    descriptors.push(Descriptor {
                        path,
                        lang: lang.clone(),
                        prog: prog.clone(),
                        size: size.clone(),
                        col: col.clone(),
                    });
                }
            }
        }
    }

    Ok(descriptors)
}

/// Substitute `{lang}`, `{prog}`, `{size}` and `{col}` in a path template.
///
/// A `{` without a closing `}` is copied literally.
pub fn render_path(template: &str, lang: &str, prog: &str, size: &str, col: &str) -> Result<PathBuf> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let name = &after[..close];
        let value = match name {
            "lang" => lang,
            "prog" => prog,
            "size" => size,
            "col" => col,
            _ => {
                return Err(BenchplotError::UnknownPlaceholder {
                    name: name.to_string(),
                }
                .into());
            }
        };
        out.push_str(value);
        rest = &after[close + 1..];
    }
    out.push_str(rest);

    Ok(PathBuf::from(out))
}

/// Recover the tags of an injected path from the
/// `<lang>/release/<prog>/<size>_<col>.txt` layout.
///
/// Anything before `<lang>` is ignored, so both `results/go/...` and
/// `/abs/results/go/...` are accepted.
pub fn descriptor_from_path(path: &Path) -> Result<Descriptor> {
    let unrecognized = || BenchplotError::UnrecognizedPath {
        path: path.to_path_buf(),
    };

    let parts: Vec<&str> = path
        .iter()
        .map(|c| c.to_str())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(unrecognized)?;

    let [.., lang, release, prog, file] = parts.as_slice() else {
        return Err(unrecognized().into());
    };

    if *release != "release" {
        return Err(unrecognized().into());
    }

    let stem = file.strip_suffix(".txt").ok_or_else(unrecognized)?;
    let (size, col) = stem.split_once('_').ok_or_else(unrecognized)?;
    if size.is_empty() || col.is_empty() {
        return Err(unrecognized().into());
    }

    Ok(Descriptor {
        path: path.to_path_buf(),
        lang: lang.to_string(),
        prog: prog.to_string(),
        size: size.to_string(),
        col: col.to_string(),
    })
}
