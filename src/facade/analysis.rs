//! Task-oriented analysis helpers for the dashboard features.
//!
//! Each [`AnalysisTask`] carries its own system prompt and decides whether the
//! caller wants chart-ready JSON or prose. Everything still flows through
//! [`GatewayClient::invoke`], so retry and fallover apply unchanged.

use crate::client::{GatewayClient, InvocationResult};
use crate::types::Message;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisTask {
    FileAnalysis,
    BusinessAnalysis,
    Benchmarking,
    MarketPotential,
}

impl AnalysisTask {
    pub const ALL: [AnalysisTask; 4] = [
        AnalysisTask::FileAnalysis,
        AnalysisTask::BusinessAnalysis,
        AnalysisTask::Benchmarking,
        AnalysisTask::MarketPotential,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            AnalysisTask::FileAnalysis => "file-analysis",
            AnalysisTask::BusinessAnalysis => "business-analysis",
            AnalysisTask::Benchmarking => "benchmarking",
            AnalysisTask::MarketPotential => "market-potential",
        }
    }

    /// Benchmarking and market potential feed charts, so they ask for JSON.
    pub fn wants_json(&self) -> bool {
        matches!(
            self,
            AnalysisTask::Benchmarking | AnalysisTask::MarketPotential
        )
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            AnalysisTask::FileAnalysis => {
                "You are a business analyst specialising in GCC markets. \
                 Analyse the supplied file and give concise, actionable insights \
                 relevant to business strategy in the GCC region."
            }
            AnalysisTask::BusinessAnalysis => {
                "You are a business analyst. Provide a comprehensive analysis of the \
                 company based on the historical data, structured into Financial \
                 Analysis, Marketing Analysis and Sales Analysis sections."
            }
            AnalysisTask::Benchmarking => {
                "You compare a company against its competitors in GCC markets. \
                 Respond with a single JSON object of the form \
                 {\"metrics\": [{\"name\": string, \"company\": number, \"competitors\": \
                 [{\"name\": string, \"value\": number}]}], \"summary\": string}."
            }
            AnalysisTask::MarketPotential => {
                "You estimate market potential for a business in the GCC region. \
                 Respond with a single JSON object of the form \
                 {\"markets\": [{\"country\": string, \"score\": number, \
                 \"rationale\": string}], \"summary\": string}."
            }
        }
    }
}

impl std::fmt::Display for AnalysisTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

impl std::str::FromStr for AnalysisTask {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        AnalysisTask::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!("Unknown analysis task: {}", s),
                    ErrorContext::new()
                        .with_field_path("task")
                        .with_source("analysis_task"),
                )
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// MIME type guessed from the file extension; empty when unknown.
pub fn mime_from_filename(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let ext = lower.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext {
        "csv" => "text/csv",
        "txt" => "text/plain",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        _ => "",
    }
}

/// Only plain-text formats are inlined into the prompt.
pub fn is_textual(name: &str, mime: &str) -> bool {
    matches!(mime, "text/csv" | "application/json" | "text/plain")
        || matches!(
            mime_from_filename(name),
            "text/csv" | "application/json" | "text/plain"
        )
}

/// Caller-supplied input for one analysis task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub prompt: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_info: Option<FileInfo>,
}

impl AnalysisContext {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_file_info(mut self, info: FileInfo) -> Self {
        self.file_info = Some(info);
        self
    }

    /// User message text: prompt, file metadata, then the inlined content.
    pub fn render(&self) -> String {
        let mut out = self.prompt.trim().to_string();
        if let Some(info) = &self.file_info {
            let _ = write!(out, "\n\nFile: {}", info.name);
            if let Some(mime) = info.mime.as_deref().filter(|m| !m.is_empty()) {
                let _ = write!(out, " ({})", mime);
            }
            if let Some(size) = info.size {
                let _ = write!(out, ", {} bytes", size);
            }
        }
        if !self.content.is_empty() {
            let _ = write!(out, "\n\nContent:\n{}", self.content);
        }
        out
    }
}

/// Onboarding answers describing the user's business.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusinessContext {
    pub business_name: String,
    pub business_type: String,
    pub business_size: String,
    pub region: String,
    #[serde(default)]
    pub goals: Vec<String>,
}

impl BusinessContext {
    fn render(&self, historical_data: &str) -> String {
        format!(
            "**User's Business Context:**\n\
             - Business Name: {}\n\
             - Business Type: {}\n\
             - Business Size: {}\n\
             - Region: {}\n\
             - Goals: {}\n\n\
             **Historical Data:**\n{}\n\n\
             **Analysis Request:**\n\
             Provide a detailed analysis of the company's performance based on the historical data. \
             Your analysis should be well-structured, easy to understand, and provide actionable insights.",
            self.business_name,
            self.business_type,
            self.business_size,
            self.region,
            self.goals.join(", "),
            historical_data,
        )
    }
}

const FORMATTING_PROMPT: &str = "Please format the following business analysis into a clean, \
human-readable format. Use markdown for headings, lists, and emphasis. Here is the analysis: ";

impl GatewayClient {
    /// Run one analysis task. JSON mode follows [`AnalysisTask::wants_json`].
    pub async fn analyze(
        &self,
        task: AnalysisTask,
        ctx: &AnalysisContext,
    ) -> Result<InvocationResult> {
        if ctx.prompt.trim().is_empty() && ctx.content.is_empty() {
            return Err(Error::validation_with_context(
                "analysis needs a prompt or content",
                ErrorContext::new()
                    .with_field_path("prompt")
                    .with_source("analyze"),
            ));
        }
        let messages = [
            Message::system(task.system_prompt()),
            Message::user(ctx.render()),
        ];
        tracing::debug!(task = task.slug(), "running analysis task");
        self.invoke(&messages, task.wants_json()).await
    }

    /// Two-pass business analysis: analyse, then reformat as markdown.
    ///
    /// Each pass is its own invocation, so the passes may be answered by
    /// different candidate models.
    pub async fn business_analysis(
        &self,
        business: &BusinessContext,
        historical_data: &str,
    ) -> Result<String> {
        let ctx = AnalysisContext::new(business.render(historical_data));
        let draft = self.analyze(AnalysisTask::BusinessAnalysis, &ctx).await?;
        let draft_text = draft.content.to_display_string();
        if draft_text.is_empty() {
            return Err(Error::EmptyCompletion {
                model: draft.model_used,
            });
        }

        let formatting = [Message::user(format!("{}{}", FORMATTING_PROMPT, draft_text))];
        let formatted = self.invoke(&formatting, false).await?;
        Ok(formatted.content.to_display_string())
    }
}
