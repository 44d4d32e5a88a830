//! In-memory doubles shared by unit and integration tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::dashboard::{Clock, SnapshotStore};
use crate::errors::AppError;
use crate::llm::{
    BackendError, BackendResponse, DocumentSource, ModelBackend, ResponseMessage,
    CHART_INSTRUCTION, DASHBOARD_INSTRUCTION,
};
use crate::models::{ChatMessage, DashboardSnapshot, DocumentExcerpt, Role};

pub const DEFAULT_CHART_REPLY: &str = "```json\n[{\"id\":\"summary\",\"type\":\"pie\",\"title\":\"Summary\",\"labels\":[\"Documents\"],\"values\":[1]}]\n```";

pub fn excerpt(title: &str, content: &str, uploaded: &str) -> DocumentExcerpt {
    DocumentExcerpt {
        title: title.to_string(),
        content: content.to_string(),
        upload_date: DateTime::parse_from_rfc3339(uploaded)
            .unwrap()
            .with_timezone(&Utc),
    }
}

/// Single-page PDF drawing `text` in Helvetica.
pub fn one_page_pdf(text: &str) -> Vec<u8> {
    let stream = format!("BT /F1 12 Tf 72 720 Td ({}) Tj ET", text);
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, body));
    }
    let xref = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{:010} 00000 n \n", offset));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref
    ));
    pdf.into_bytes()
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Default)]
struct FakeState {
    calls: Vec<RecordedCall>,
    failing: HashSet<String>,
    fail_all: bool,
    chart_reply: Option<String>,
    dashboards: usize,
    charts: usize,
}

/// Scripted model backend.
///
/// Dashboard requests get `## Dashboard #n`, chart requests get the configured
/// chart reply, and anything else echoes `[model] <last user message>`.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_model(&self, model: &str) {
        self.state.lock().unwrap().failing.insert(model.to_string());
    }

    pub fn fail_all(&self) {
        self.state.lock().unwrap().fail_all = true;
    }

    pub fn recover(&self) {
        let mut state = self.state.lock().unwrap();
        state.fail_all = false;
        state.failing.clear();
    }

    pub fn set_chart_reply(&self, reply: &str) {
        self.state.lock().unwrap().chart_reply = Some(reply.to_string());
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.model).collect()
    }

    /// Dashboard bodies successfully produced.
    pub fn dashboard_calls(&self) -> usize {
        self.state.lock().unwrap().dashboards
    }

    /// Chart replies successfully produced.
    pub fn chart_calls(&self) -> usize {
        self.state.lock().unwrap().charts
    }
}

#[async_trait]
impl ModelBackend for FakeBackend {
    async fn chat(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<BackendResponse, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall {
            model: model.to_string(),
            messages: messages.to_vec(),
        });

        if state.fail_all || state.failing.contains(model) {
            return Err(BackendError::Transport(format!(
                "connection refused by {}",
                model
            )));
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let reply = if last_user == DASHBOARD_INSTRUCTION {
            state.dashboards += 1;
            format!("## Dashboard #{}\n\nGenerated by {}.", state.dashboards, model)
        } else if last_user == CHART_INSTRUCTION {
            state.charts += 1;
            state
                .chart_reply
                .clone()
                .unwrap_or_else(|| DEFAULT_CHART_REPLY.to_string())
        } else {
            format!("[{}] {}", model, last_user)
        };

        Ok(BackendResponse::Message {
            message: ResponseMessage {
                role: Some("assistant".to_string()),
                content: Some(reply),
            },
        })
    }
}

pub struct MemoryDocuments {
    docs: Vec<DocumentExcerpt>,
}

impl MemoryDocuments {
    pub fn new(docs: Vec<DocumentExcerpt>) -> Self {
        Self { docs }
    }
}

#[async_trait]
impl DocumentSource for MemoryDocuments {
    async fn list_recent_documents(&self, limit: usize) -> Result<Vec<DocumentExcerpt>, AppError> {
        let mut docs = self.docs.clone();
        docs.sort_by(|a, b| b.upload_date.cmp(&a.upload_date));
        docs.truncate(limit);
        Ok(docs)
    }
}

/// Document source whose store is always down.
pub struct FailingDocuments;

#[async_trait]
impl DocumentSource for FailingDocuments {
    async fn list_recent_documents(&self, _limit: usize) -> Result<Vec<DocumentExcerpt>, AppError> {
        Err(AppError::Database("database is locked".to_string()))
    }
}

#[derive(Default)]
pub struct MemorySnapshots {
    rows: Mutex<BTreeMap<(String, NaiveDate), DashboardSnapshot>>,
}

impl MemorySnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn find_snapshot(
        &self,
        department: &str,
        date: NaiveDate,
    ) -> Result<Option<DashboardSnapshot>, AppError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.get(&(department.to_string(), date)).cloned())
    }

    async fn create_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (snapshot.department.clone(), snapshot.generated_date);
        Ok(rows.entry(key).or_insert_with(|| snapshot.clone()).clone())
    }

    async fn save_snapshot(
        &self,
        snapshot: &DashboardSnapshot,
    ) -> Result<DashboardSnapshot, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let key = (snapshot.department.clone(), snapshot.generated_date);
        rows.insert(key, snapshot.clone());
        Ok(snapshot.clone())
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
