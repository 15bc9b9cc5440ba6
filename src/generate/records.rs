//! Essay input and variant output records, stored as CSV or JSONL.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{GenerateError, Result};
use crate::prompt::PromptTemplate;

/// One source essay
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EssayRecord {
    pub text_id: String,
    pub full_text: String,
    pub intent: Option<String>,
}

impl EssayRecord {
    pub fn new(text_id: impl Into<String>, full_text: impl Into<String>) -> Self {
        Self {
            text_id: text_id.into(),
            full_text: full_text.into(),
            intent: None,
        }
    }

    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Trimmed intent, empty when absent
    pub fn intent(&self) -> &str {
        self.intent.as_deref().unwrap_or_default().trim()
    }
}

/// On-disk layout of essay and variant files, picked by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    /// Header row then one row per record
    Csv,
    /// One JSON object per line
    Jsonl,
}

impl RecordFormat {
    /// `.csv` (any case) is CSV; everything else is JSONL
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => RecordFormat::Csv,
            _ => RecordFormat::Jsonl,
        }
    }
}

/// Read essays from a CSV or JSONL file
///
/// CSV files need a header row; unknown columns are ignored and missing ones
/// default to empty. Blank JSONL lines are skipped.
pub fn read_essays(path: impl AsRef<Path>) -> Result<Vec<EssayRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    match RecordFormat::from_path(path) {
        RecordFormat::Csv => {
            let mut reader = csv::Reader::from_reader(file);
            let mut essays: Vec<EssayRecord> = Vec::new();
            for row in reader.deserialize() {
                essays.push(row?);
            }
            Ok(essays)
        }
        RecordFormat::Jsonl => {
            let mut essays = Vec::new();
            for (index, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let essay = serde_json::from_str(&line).map_err(|source| GenerateError::InvalidEssay {
                    path: path.to_path_buf(),
                    line: index + 1,
                    source,
                })?;
                essays.push(essay);
            }
            Ok(essays)
        }
    }
}

/// Outcome of one generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VariantStatus {
    Ok,
    Error,
}

/// One generated variant, as written to the output file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub source_text_id: String,
    pub source_text: String,
    pub prompt_id: String,
    pub prompt_version: u32,
    pub variant: String,
    pub level: String,
    pub aspects: String,
    pub model: String,
    pub generated_text: String,
    pub status: VariantStatus,
    pub error: String,
    pub generated_at: String,
}

impl VariantRecord {
    /// Output columns, in field order
    pub const COLUMNS: [&'static str; 12] = [
        "source_text_id",
        "source_text",
        "prompt_id",
        "prompt_version",
        "variant",
        "level",
        "aspects",
        "model",
        "generated_text",
        "status",
        "error",
        "generated_at",
    ];

    /// Record describing `template` applied to `essay`, before the outcome is known
    pub fn new(essay: &EssayRecord, template: &PromptTemplate, model: &str) -> Self {
        Self {
            source_text_id: essay.text_id.clone(),
            source_text: essay.full_text.clone(),
            prompt_id: template.id().to_string(),
            prompt_version: template.prompt_version(),
            variant: template.variant().to_string(),
            level: template.level().to_string(),
            aspects: template.aspects().join(","),
            model: model.to_string(),
            generated_text: String::new(),
            status: VariantStatus::Ok,
            error: String::new(),
            generated_at: String::new(),
        }
    }

    pub fn succeeded(mut self, generated_text: impl Into<String>) -> Self {
        self.generated_text = generated_text.into();
        self.status = VariantStatus::Ok;
        self.generated_at = chrono::Utc::now().to_rfc3339();
        self
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.status = VariantStatus::Error;
        self.error = error.to_string();
        self.generated_at = chrono::Utc::now().to_rfc3339();
        self
    }
}

enum Sink {
    Csv(csv::Writer<File>),
    Jsonl(File),
}

/// Append-only variant writer that never overwrites an existing file
pub struct VariantWriter {
    path: PathBuf,
    sink: Sink,
}

impl VariantWriter {
    /// Create the output file; fails with `OutputExists` if it is already there
    ///
    /// CSV output gets its header row immediately, even if no record follows.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => GenerateError::OutputExists(path.clone()),
                _ => GenerateError::Io(e),
            })?;

        let sink = match RecordFormat::from_path(&path) {
            RecordFormat::Csv => {
                let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
                writer.write_record(VariantRecord::COLUMNS)?;
                writer.flush()?;
                Sink::Csv(writer)
            }
            RecordFormat::Jsonl => Sink::Jsonl(file),
        };
        Ok(Self { path, sink })
    }

    /// Append one record and flush it
    pub fn append(&mut self, record: &VariantRecord) -> Result<()> {
        match &mut self.sink {
            Sink::Csv(writer) => {
                writer.serialize(record)?;
                writer.flush()?;
            }
            Sink::Jsonl(file) => {
                writeln!(file, "{}", serde_json::to_string(record)?)?;
                file.flush()?;
            }
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RecordFormat {
        match self.sink {
            Sink::Csv(_) => RecordFormat::Csv,
            Sink::Jsonl(_) => RecordFormat::Jsonl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::TemplateRecord;
    use std::fs;
    use tempfile::TempDir;

    fn template() -> PromptTemplate {
        TemplateRecord::new("v1.ai_refined_grammar", "ai_refined", "moderate")
            .with_user("{essay_text}")
            .with_placeholders(["essay_text"])
            .with_aspects(["grammar", "conventions"])
            .try_into()
            .unwrap()
    }

    #[test]
    fn test_read_essays_skips_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("essays.jsonl");
        fs::write(
            &path,
            "{\"text_id\": \"e1\", \"full_text\": \"One.\", \"intent\": \" grammar \"}\n\n{\"text_id\": \"e2\", \"full_text\": \"Two.\"}\n",
        )
        .unwrap();

        let essays = read_essays(&path).unwrap();
        assert_eq!(essays.len(), 2);
        assert_eq!(essays[0].intent(), "grammar");
        assert_eq!(essays[1].intent(), "");
        assert_eq!(essays[1].full_text, "Two.");
    }

    #[test]
    fn test_read_essays_reports_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("essays.jsonl");
        fs::write(&path, "{\"text_id\": \"e1\"}\nnot json\n").unwrap();

        let err = read_essays(&path).unwrap_err();
        assert!(matches!(err, GenerateError::InvalidEssay { line: 2, .. }));
    }

    #[test]
    fn test_read_essays_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_essays(temp_dir.path().join("nope.jsonl"));
        assert!(matches!(result, Err(GenerateError::Io(_))));
    }

    #[test]
    fn test_variant_record_from_template() {
        let essay = EssayRecord::new("e1", "Some text.");
        let record = VariantRecord::new(&essay, &template(), "gpt-test").succeeded("Better text.");
        assert_eq!(record.prompt_id, "v1.ai_refined_grammar");
        assert_eq!(record.aspects, "grammar,conventions");
        assert_eq!(record.status, VariantStatus::Ok);
        assert!(chrono::DateTime::parse_from_rfc3339(&record.generated_at).is_ok());
    }

    #[test]
    fn test_variant_record_failed() {
        let essay = EssayRecord::new("e1", "Some text.");
        let record = VariantRecord::new(&essay, &template(), "gpt-test").failed("API error 500: boom");
        assert_eq!(record.status, VariantStatus::Error);
        assert_eq!(record.error, "API error 500: boom");
        assert!(record.generated_text.is_empty());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "ERROR");
    }

    #[test]
    fn test_writer_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.jsonl");
        let essay = EssayRecord::new("e1", "x");

        let mut writer = VariantWriter::create(&path).unwrap();
        writer.append(&VariantRecord::new(&essay, &template(), "m").succeeded("a")).unwrap();
        writer.append(&VariantRecord::new(&essay, &template(), "m").succeeded("b")).unwrap();
        assert_eq!(writer.path(), path.as_path());

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<VariantRecord> = content.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].generated_text, "b");
    }

    #[test]
    fn test_writer_refuses_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.jsonl");
        fs::write(&path, "keep me").unwrap();

        let result = VariantWriter::create(&path);
        assert!(matches!(result, Err(GenerateError::OutputExists(p)) if p == path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn test_record_format_from_extension() {
        assert_eq!(RecordFormat::from_path("essays.csv"), RecordFormat::Csv);
        assert_eq!(RecordFormat::from_path("ESSAYS.CSV"), RecordFormat::Csv);
        assert_eq!(RecordFormat::from_path("essays.jsonl"), RecordFormat::Jsonl);
        assert_eq!(RecordFormat::from_path("essays"), RecordFormat::Jsonl);
    }

    #[test]
    fn test_read_essays_csv() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("essays.csv");
        fs::write(
            &path,
            "text_id,full_text,intent,score\ne1,\"One, with a comma.\",grammar,3\ne2,\"Two\nlines.\",,4\n",
        )
        .unwrap();

        let essays = read_essays(&path).unwrap();
        assert_eq!(essays.len(), 2);
        assert_eq!(essays[0], EssayRecord::new("e1", "One, with a comma.").with_intent("grammar"));
        assert_eq!(essays[1].full_text, "Two\nlines.");
        assert_eq!(essays[1].intent(), "");
    }

    #[test]
    fn test_read_essays_csv_without_intent_column() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("essays.csv");
        fs::write(&path, "text_id,full_text\ne1,Hello.\n").unwrap();

        let essays = read_essays(&path).unwrap();
        assert_eq!(essays, vec![EssayRecord::new("e1", "Hello.")]);
    }

    #[test]
    fn test_csv_writer_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        let essay = EssayRecord::new("e1", "Line one,\nline \"two\".");

        let mut writer = VariantWriter::create(&path).unwrap();
        assert_eq!(writer.format(), RecordFormat::Csv);
        let ok = VariantRecord::new(&essay, &template(), "m").succeeded("done");
        let failed = VariantRecord::new(&essay, &template(), "m").failed("boom");
        writer.append(&ok).unwrap();
        writer.append(&failed).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next().unwrap(), VariantRecord::COLUMNS.join(","));

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<VariantRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(rows, vec![ok, failed]);
        assert_eq!(rows[0].aspects, "grammar,conventions");
        assert!(content.contains(",OK,") && content.contains(",ERROR,boom,"));
    }

    #[test]
    fn test_csv_columns_follow_field_order() {
        let essay = EssayRecord::new("e1", "x");
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.serialize(VariantRecord::new(&essay, &template(), "m")).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), VariantRecord::COLUMNS.join(","));
    }

    #[test]
    fn test_csv_writer_header_without_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("out.csv");
        VariantWriter::create(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{}\n", VariantRecord::COLUMNS.join(",")));
    }
}
