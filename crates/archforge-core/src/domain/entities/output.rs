use std::collections::HashSet;

use serde::Serialize;

use crate::domain::{
    entities::common::{Permissions, RelativePath},
    error::DomainError,
    value_objects::{ServiceType, SyntaxLanguage},
};

/// One emitted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub path: RelativePath,
    pub content: String,
    pub language: SyntaxLanguage,
    pub permissions: Permissions,
}

impl Output {
    pub fn new(
        path: &str,
        content: impl Into<String>,
        language: SyntaxLanguage,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            path: RelativePath::try_new(path)?,
            content: content.into(),
            language,
            permissions: Permissions::read_write(),
        })
    }

    pub fn executable(mut self) -> Self {
        self.permissions = Permissions::executable();
        self
    }

    /// Path relative to the export root, `/`-separated.
    pub fn filename(&self) -> String {
        self.path.to_slash_string()
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Why a component did not get a full resource definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    /// No fragment generator for (service type, provider, format).
    Unmapped,
    /// The component has no binding for the requested provider.
    MissingBinding,
}

/// How the emitter handled the degraded component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// A commented or metadata placeholder stands in for the resource.
    Placeholder,
    /// The component is left out of the output.
    Omit,
}

/// A component that was soft-degraded during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub component: String,
    pub service_type: ServiceType,
    pub reason: DegradationReason,
    pub handled_by: FallbackPolicy,
}

impl Degradation {
    pub fn describe(&self) -> String {
        let reason = match self.reason {
            DegradationReason::Unmapped => "has no mapping for this format and provider",
            DegradationReason::MissingBinding => "has no binding for this provider",
        };
        let action = match self.handled_by {
            FallbackPolicy::Placeholder => "placeholder emitted",
            FallbackPolicy::Omit => "omitted",
        };
        format!(
            "{} ({}) {}; {}",
            self.component, self.service_type, reason, action
        )
    }
}

/// Everything one emitter run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub outputs: Vec<Output>,
    pub degradations: Vec<Degradation>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, output: Output) {
        self.outputs.push(output);
    }

    pub fn degrade(&mut self, degradation: Degradation) {
        self.degradations.push(degradation);
    }

    pub fn is_complete(&self) -> bool {
        self.degradations.is_empty()
    }

    pub fn file(&self, filename: &str) -> Option<&Output> {
        self.outputs.iter().find(|o| o.filename() == filename)
    }

    /// An emitted file set must be non-empty with unique filenames.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.outputs.is_empty() {
            return Err(DomainError::InvalidOutput("generation produced no files".into()));
        }

        let mut seen = HashSet::new();
        for output in &self.outputs {
            let filename = output.filename();
            if !seen.insert(filename.clone()) {
                return Err(DomainError::DuplicateOutput { filename });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_generation_is_invalid() {
        assert!(Generation::new().validate().is_err());
    }

    #[test]
    fn duplicate_filenames_are_invalid() {
        let mut generation = Generation::new();
        generation.push(Output::new("main.tf", "", SyntaxLanguage::Hcl).unwrap());
        generation.push(Output::new("main.tf", "", SyntaxLanguage::Hcl).unwrap());
        assert_eq!(
            generation.validate(),
            Err(DomainError::DuplicateOutput {
                filename: "main.tf".into()
            })
        );
    }

    #[test]
    fn executable_marks_permissions() {
        let out = Output::new("deploy.sh", "#!/bin/bash", SyntaxLanguage::Shell)
            .unwrap()
            .executable();
        assert!(out.permissions.executable_flag());
    }

    #[test]
    fn degradation_description_names_component() {
        let d = Degradation {
            component: "edge".into(),
            service_type: ServiceType::Cdn,
            reason: DegradationReason::Unmapped,
            handled_by: FallbackPolicy::Omit,
        };
        assert!(d.describe().starts_with("edge (cdn)"));
        assert!(d.describe().ends_with("omitted"));
    }
}
