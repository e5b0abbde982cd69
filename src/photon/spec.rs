use std::fmt;

use crate::error::{Error, Result};

/// What a photon is built from, as written on the command line:
///
/// - `hf:<model_id>[@<revision>]` (alias `huggingface:`)
/// - `py:<path>:<ClassName>`
/// - `docker:<image>` (alias `image:`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotonModelSpec {
    HuggingFace {
        model_id: String,
        revision: Option<String>,
    },
    Python {
        path: String,
        class: String,
    },
    ContainerImage {
        image: String,
    },
}

type Parser = fn(&str) -> Result<PhotonModelSpec>;

/// Schema prefix to parser. Lookup is case-sensitive.
const SCHEMAS: &[(&str, Parser)] = &[
    ("hf", parse_hf),
    ("huggingface", parse_hf),
    ("py", parse_py),
    ("docker", parse_image),
    ("image", parse_image),
];

impl PhotonModelSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let (schema, rest) = spec.split_once(':').ok_or_else(|| {
            Error::validation(format!(
                "Invalid model spec {spec:?}: expected <schema>:<model>, e.g. hf:gpt2"
            ))
        })?;
        let parser = SCHEMAS
            .iter()
            .find(|(name, _)| *name == schema)
            .map(|(_, parser)| parser)
            .ok_or_else(|| {
                let known: Vec<&str> = SCHEMAS.iter().map(|(name, _)| *name).collect();
                Error::validation(format!(
                    "Unknown model schema {schema:?}, expected one of: {}",
                    known.join(", ")
                ))
            })?;
        if rest.is_empty() {
            return Err(Error::validation(format!("Model spec {spec:?} names no model")));
        }
        parser(rest)
    }

    /// Schema prefix used when rendering the spec back to a string.
    pub fn schema(&self) -> &'static str {
        match self {
            PhotonModelSpec::HuggingFace { .. } => "hf",
            PhotonModelSpec::Python { .. } => "py",
            PhotonModelSpec::ContainerImage { .. } => "docker",
        }
    }
}

impl fmt::Display for PhotonModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotonModelSpec::HuggingFace { model_id, revision: Some(rev) } => {
                write!(f, "hf:{model_id}@{rev}")
            }
            PhotonModelSpec::HuggingFace { model_id, revision: None } => write!(f, "hf:{model_id}"),
            PhotonModelSpec::Python { path, class } => write!(f, "py:{path}:{class}"),
            PhotonModelSpec::ContainerImage { image } => write!(f, "docker:{image}"),
        }
    }
}

fn parse_hf(rest: &str) -> Result<PhotonModelSpec> {
    let (model_id, revision) = match rest.split_once('@') {
        Some((id, rev)) if !rev.is_empty() => (id, Some(rev.to_string())),
        Some((id, _)) => (id, None),
        None => (rest, None),
    };
    if model_id.is_empty() {
        return Err(Error::validation(
            "Invalid HuggingFace model spec, expected hf:<model_name>[@<revision>]",
        ));
    }
    Ok(PhotonModelSpec::HuggingFace {
        model_id: model_id.to_string(),
        revision,
    })
}

fn parse_py(rest: &str) -> Result<PhotonModelSpec> {
    // The class name follows the last colon so paths may contain colons.
    match rest.rsplit_once(':') {
        Some((path, class)) if !path.is_empty() && !class.is_empty() => Ok(PhotonModelSpec::Python {
            path: path.to_string(),
            class: class.to_string(),
        }),
        _ => Err(Error::validation(format!(
            "Invalid python model spec {rest:?}, expected py:<path>:<ClassName>"
        ))),
    }
}

fn parse_image(rest: &str) -> Result<PhotonModelSpec> {
    Ok(PhotonModelSpec::ContainerImage {
        image: rest.to_string(),
    })
}
