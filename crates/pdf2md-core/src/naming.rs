use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{CollisionPolicy, ConvertError};

/// File name without extension, used for the output name and the `#` title.
pub fn document_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

/// Output file name for a stem: `<stem>[-<ordinal>]<suffix>.md`.
pub fn output_file_name(stem: &str, suffix: &str, ordinal: Option<usize>) -> String {
    match ordinal {
        Some(n) => format!("{stem}-{n}{suffix}.md"),
        None => format!("{stem}{suffix}.md"),
    }
}

/// Where a discovered document will be written.
#[derive(Debug)]
pub struct PlannedOutput {
    pub source: PathBuf,
    pub stem: String,
    /// The output file, or the reason this document cannot be written.
    pub target: Result<PathBuf, ConvertError>,
}

/// Assign an output file to every document, in order.
///
/// Names are compared case-insensitively. The first document to claim a
/// name keeps it; later ones are renamed or failed according to `policy`.
/// Planning depends only on the input order, so repeating a run over the
/// same inputs produces the same names.
pub fn plan_outputs(
    sources: &[PathBuf],
    output_dir: &Path,
    suffix: &str,
    policy: CollisionPolicy,
) -> Vec<PlannedOutput> {
    // lowercased file name -> source that claimed it
    let mut taken: HashMap<String, PathBuf> = HashMap::new();
    let mut plans = Vec::with_capacity(sources.len());

    for source in sources {
        let Some(stem) = document_stem(source) else {
            plans.push(PlannedOutput {
                source: source.clone(),
                stem: String::new(),
                target: Err(ConvertError::NoStem {
                    path: source.clone(),
                }),
            });
            continue;
        };

        let name = output_file_name(&stem, suffix, None);
        let key = name.to_lowercase();

        let target = match taken.get(&key) {
            None => {
                taken.insert(key, source.clone());
                Ok(output_dir.join(name))
            }
            Some(other) => match policy {
                CollisionPolicy::Fail => {
                    tracing::warn!(
                        source = %source.display(),
                        other = %other.display(),
                        output = %name,
                        "output name collision"
                    );
                    Err(ConvertError::Collision {
                        output: output_dir.join(&name),
                        other: other.clone(),
                    })
                }
                CollisionPolicy::Suffix => {
                    let mut ordinal = 2;
                    let renamed = loop {
                        let candidate = output_file_name(&stem, suffix, Some(ordinal));
                        if !taken.contains_key(&candidate.to_lowercase()) {
                            break candidate;
                        }
                        ordinal += 1;
                    };
                    tracing::info!(
                        source = %source.display(),
                        output = %renamed,
                        "output name collision, using numbered name"
                    );
                    taken.insert(renamed.to_lowercase(), source.clone());
                    Ok(output_dir.join(renamed))
                }
            },
        };

        plans.push(PlannedOutput {
            source: source.clone(),
            stem,
            target,
        });
    }

    plans
}
