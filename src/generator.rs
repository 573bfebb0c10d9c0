//! Solution generation: turns a classified sign-up into a code stub on disk.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::{Category, Judgment, SignupRecord, SolutionRecord};
use crate::error::{DeliveryError, Result};
use crate::id::generate_solution_id;

/// Produces a solution (and its artifact) for a classified sign-up.
pub trait SolutionGenerator: Send + Sync {
    fn generate(&self, signup: &SignupRecord, judgment: &Judgment) -> Result<SolutionRecord>;
}

/// Writes one boilerplate stub per solution into `artifacts_dir`.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    artifacts_dir: PathBuf,
}

impl TemplateGenerator {
    pub fn new(artifacts_dir: impl AsRef<Path>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    fn artifact_path(&self, solution_id: &str) -> PathBuf {
        self.artifacts_dir.join(format!("{}.rs", solution_id))
    }
}

impl SolutionGenerator for TemplateGenerator {
    fn generate(&self, signup: &SignupRecord, judgment: &Judgment) -> Result<SolutionRecord> {
        let id = generate_solution_id();
        let path = self.artifact_path(&id);
        let code = render_artifact(signup, judgment);

        fs::create_dir_all(&self.artifacts_dir).map_err(|e| {
            DeliveryError::Generation(format!(
                "Failed to create {}: {}",
                self.artifacts_dir.display(),
                e
            ))
        })?;

        // Artifacts are write-once
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| DeliveryError::Generation(format!("Failed to create {}: {}", path.display(), e)))?;
        file.write_all(code.as_bytes())?;

        log::info!("Automation created: {} ({})", id, judgment.category());
        Ok(SolutionRecord::new(id, &signup.id, judgment.clone(), path))
    }
}

type TemplateFn = fn(&Judgment) -> String;

/// Category-specific bodies. Categories without an entry use `generic_body`.
const TEMPLATES: &[(Category, TemplateFn)] = &[
    (Category::Email, email_body),
    (Category::DataEntry, data_entry_body),
    (Category::Reporting, reporting_body),
];

/// Full artifact text: header plus the body selected by category.
pub fn render_artifact(signup: &SignupRecord, judgment: &Judgment) -> String {
    let body = TEMPLATES
        .iter()
        .find(|(category, _)| *category == judgment.category())
        .map(|(_, render)| render(judgment))
        .unwrap_or_else(|| generic_body(judgment));

    format!(
        "//! Automation for: {}\n//! {}\n//! Created at: {}\n\n{}",
        signup.name,
        signup.company,
        Utc::now().to_rfc3339(),
        body
    )
}

fn email_body(judgment: &Judgment) -> String {
    format!(
        r#"// Email automation
// Triggers: {triggers}

fn automate_email() -> Result<(), Box<dyn std::error::Error>> {{
    println!("Processing inbox...");
    // Connect to the mail provider here
    Ok(())
}}

fn main() {{
    if let Err(e) = automate_email() {{
        eprintln!("{{e}}");
    }}
}}
"#,
        triggers = judgment.integrations().join(", ")
    )
}

fn data_entry_body(judgment: &Judgment) -> String {
    format!(
        r#"// Data entry automation
// Integrates with: {targets}
// Expected ROI: {roi}

fn automate_data_entry() -> Result<(), Box<dyn std::error::Error>> {{
    println!("Automating data entry...");
    Ok(())
}}

fn main() {{
    if let Err(e) = automate_data_entry() {{
        eprintln!("{{e}}");
    }}
}}
"#,
        targets = judgment.integrations().join(", "),
        roi = judgment.estimated_roi()
    )
}

fn reporting_body(judgment: &Judgment) -> String {
    format!(
        r#"// Reporting automation
// Collects from: {sources}
// Frequency: daily

fn generate_reports() -> Result<(), Box<dyn std::error::Error>> {{
    println!("Generating reports...");
    Ok(())
}}

fn main() {{
    if let Err(e) = generate_reports() {{
        eprintln!("{{e}}");
    }}
}}
"#,
        sources = judgment.integrations().join(", ")
    )
}

fn generic_body(judgment: &Judgment) -> String {
    format!(
        r#"fn run_automation() -> Result<(), Box<dyn std::error::Error>> {{
    println!("Custom automation running...");
    println!("Type: {category}");
    println!("ROI: {roi}");
    Ok(())
}}

fn main() {{
    if let Err(e) = run_automation() {{
        eprintln!("{{e}}");
    }}
}}
"#,
        category = judgment.category(),
        roi = judgment.estimated_roi()
    )
}
