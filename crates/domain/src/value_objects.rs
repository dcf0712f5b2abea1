use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix shared by every generated job id
pub const JOB_ID_PREFIX: &str = "job-";
const JOB_ID_HEX_LEN: usize = 8;

/// Crawler platform a task is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Youtube,
    Tiktok,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youtube" => Ok(Platform::Youtube),
            "tiktok" => Ok(Platform::Tiktok),
            _ => Err(format!("Unsupported platform: {s}, supported: youtube, tiktok")),
        }
    }
}

/// Kinds of crawl work the dispatcher understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    ResearchKeyword,
    CrawlLinks,
    ResearchAndCrawl,
    DryRunKeyword,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::ResearchKeyword => "research_keyword",
            TaskType::CrawlLinks => "crawl_links",
            TaskType::ResearchAndCrawl => "research_and_crawl",
            TaskType::DryRunKeyword => "dry_run_keyword",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "research_keyword" => Ok(TaskType::ResearchKeyword),
            "crawl_links" => Ok(TaskType::CrawlLinks),
            "research_and_crawl" => Ok(TaskType::ResearchAndCrawl),
            "dry_run_keyword" => Ok(TaskType::DryRunKeyword),
            _ => Err(format!(
                "Unsupported task type: {s}, supported: research_keyword, crawl_links, research_and_crawl, dry_run_keyword"
            )),
        }
    }
}

/// `job-` followed by the first 8 hex characters of a random v4 UUID
pub fn generate_job_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{JOB_ID_PREFIX}{}", &hex[..JOB_ID_HEX_LEN])
}

pub fn is_valid_job_id(job_id: &str) -> bool {
    job_id.strip_prefix(JOB_ID_PREFIX).is_some_and(|suffix| {
        suffix.len() == JOB_ID_HEX_LEN
            && suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    })
}
