// src/deploy/bpmn.rs

//! Reading process-definition files: which form resources a diagram
//! references, and which of them exist in the resources directory.

use std::path::{Path, PathBuf};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::errors::{BakerError, Result};
use crate::fs::FileSystem;

/// Attributes whose value names a deployable resource.
pub const RESOURCE_ATTRIBUTES: [&str; 2] = ["camunda:formKey", "camunda:resource"];

/// Prefix of resource references bundled with the deployment.
pub const EMBEDDED_PREFIX: &str = "embedded:deployment:";

/// Diagram interchange section; nothing after its start is inspected.
const DIAGRAM_TAG: &[u8] = b"bpmndi:BPMNDiagram";

/// A resource file shipped with a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployResource {
    /// File name, used as the multipart field name.
    pub name: String,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// A parsed process-definition file ready to be deployed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDefinition {
    pub filepath: PathBuf,
    pub filename: String,
    pub content: Vec<u8>,
    /// Referenced resources found in the resources directory.
    pub resources: Vec<DeployResource>,
    /// Whether this definition is affected by the incoming changes.
    pub has_changed: bool,
}

/// Names of the resources referenced by `xml`, in document order and
/// without duplicates.
pub fn referenced_resources(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut resources: Vec<String> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if e.name().as_ref() == DIAGRAM_TAG {
                    break;
                }
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::from)?;
                    let key = attr.key.as_ref();
                    if !RESOURCE_ATTRIBUTES.iter().any(|n| n.as_bytes() == key) {
                        continue;
                    }

                    let value = String::from_utf8_lossy(&attr.value);
                    let name = value.trim().replace(EMBEDDED_PREFIX, "");
                    if !name.is_empty() && !resources.contains(&name) {
                        resources.push(name);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(resources)
}

/// True without an incoming-change set; otherwise true iff any incoming
/// name is one of `resources`.
pub fn has_incoming_changes(resources: &[String], incoming: Option<&[String]>) -> bool {
    match incoming {
        None => true,
        Some(changes) => changes.iter().any(|c| resources.contains(c)),
    }
}

/// Read `path` and resolve its resources against `resources_dir`.
///
/// Referenced resources missing from `resources_dir` are left out of the
/// deployment.
pub fn load_process_definition(
    fs: &dyn FileSystem,
    path: &Path,
    resources_dir: &Path,
    incoming: Option<&[String]>,
) -> Result<ProcessDefinition> {
    let content = fs.read(path)?;
    let xml = std::str::from_utf8(&content).map_err(|e| {
        BakerError::deploy(path.display().to_string(), format!("not valid UTF-8: {e}"))
    })?;

    let referenced = referenced_resources(xml)?;
    let has_changed = has_incoming_changes(&referenced, incoming);

    let mut resources = Vec::new();
    for name in &referenced {
        let resource_path = resources_dir.join(name);
        if !fs.is_file(&resource_path) {
            continue;
        }
        resources.push(DeployResource {
            name: file_name_of(&resource_path),
            content: fs.read(&resource_path)?,
            path: resource_path,
        });
    }

    Ok(ProcessDefinition {
        filename: file_name_of(path),
        filepath: path.to_path_buf(),
        content,
        resources,
        has_changed,
    })
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
