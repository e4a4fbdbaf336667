//! Workbook upload client
//!
//! Sends an Excel workbook to a running `iot-energy-sheets` server and prints
//! the worksheet list, the parsed readings or a consumption summary.
//!
//! Usage:
//!   `cargo run --bin upload_workbook -- readings.xlsx --action summary --plant "North Plant"`

use anyhow::{Context, Result, bail};
use clap::{Arg, Command};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, multipart};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::time::Duration;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MAX_LISTED_ERRORS: usize = 10;

pub struct UploadClient {
    base_url: String,
    client: Client,
}

impl UploadClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post_workbook(
        &self,
        endpoint: &str,
        file_path: &Path,
        query: &[(&str, String)],
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);

        let file_content = fs::read(file_path)
            .with_context(|| format!("Failed to read {}", file_path.display()))?;
        let file_name = file_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.xlsx")
            .to_string();

        let form = multipart::Form::new().part(
            "file",
            multipart::Part::bytes(file_content)
                .file_name(file_name)
                .mime_str(XLSX_MIME)?,
        );

        let response = self
            .client
            .post(&url)
            .query(query)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<Value>().await?)
        } else {
            let error_text = response.text().await.unwrap_or_default();
            bail!("HTTP {status} {endpoint}: {error_text}")
        }
    }
}

fn print_sheets(result: &Value) {
    let target = result.get("target_sheet").and_then(Value::as_str);
    for name in result["sheets"].as_array().into_iter().flatten() {
        let name = name.as_str().unwrap_or_default();
        if Some(name) == target {
            println!("  {} {}", style(name).bold().green(), style("(readings)").dim());
        } else {
            println!("  {name}");
        }
    }
    if target.is_none() {
        println!("{} No worksheet matches the configured readings sheet", style("!").yellow());
    }
}

fn print_parse(result: &Value) {
    let points = result["points"].as_array().map_or(0, Vec::len);
    let errors = result["errors"].as_array().cloned().unwrap_or_default();

    println!(
        "Worksheet {}: {} readings, {} row errors ({} ms)",
        style(result["sheet"].as_str().unwrap_or_default()).bold(),
        style(points).bold().green(),
        style(errors.len()).bold().yellow(),
        result["processing_time_ms"]
    );
    for error in errors.iter().take(MAX_LISTED_ERRORS) {
        println!(
            "  {} row {} {}: {}",
            style("!").yellow(),
            error["row"],
            error["type"].as_str().unwrap_or_default(),
            error["message"].as_str().unwrap_or_default()
        );
    }
    if errors.len() > MAX_LISTED_ERRORS {
        println!("  ... {} more", errors.len() - MAX_LISTED_ERRORS);
    }
}

fn print_summary(result: &Value) {
    let summary = &result["summary"];
    println!(
        "Worksheet {}: {} readings totalling {} kW",
        style(result["sheet"].as_str().unwrap_or_default()).bold(),
        style(&summary["readings"]).bold().green(),
        style(&summary["total_kw"]).bold().cyan()
    );
    if let (Some(first), Some(last)) = (
        summary["first_reading"].as_str(),
        summary["last_reading"].as_str(),
    ) {
        println!("  From {first} to {last}");
    }
    for (label, key) in [("Plant", "by_plant"), ("Sensor", "by_sensor"), ("Day", "by_day")] {
        if let Some(totals) = summary[key].as_object() {
            for (name, total) in totals {
                println!("  {label:<6} {name:<30} {total}");
            }
        }
    }
    let row_errors = summary["row_errors"].as_u64().unwrap_or(0);
    if row_errors > 0 {
        println!("{} {row_errors} rows could not be parsed", style("!").yellow());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("Workbook uploader")
        .version("0.1")
        .about("Uploads an Excel workbook to the IoT energy sheets API")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Path to the .xlsx or .xlsm workbook")
                .value_parser(clap::value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("API base URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new("action")
                .short('a')
                .long("action")
                .value_parser(["sheets", "parse", "summary"])
                .default_value("parse"),
        )
        .arg(
            Arg::new("sheet")
                .short('s')
                .long("sheet")
                .value_name("NAME")
                .help("Worksheet to read; the server's readings sheet when omitted"),
        )
        .arg(Arg::new("plant").long("plant").value_name("PLANT"))
        .arg(Arg::new("sensor").long("sensor").value_name("SENSOR"))
        .get_matches();

    let Some(file_path) = matches.get_one::<PathBuf>("file") else {
        bail!("A workbook file is required");
    };
    let base_url = matches
        .get_one::<String>("url")
        .map_or("http://localhost:3000", String::as_str);
    let action = matches
        .get_one::<String>("action")
        .map_or("parse", String::as_str);

    let mut query: Vec<(&str, String)> = Vec::new();
    for key in ["sheet", "plant", "sensor"] {
        if let Some(value) = matches.get_one::<String>(key) {
            query.push((key, value.clone()));
        }
    }

    println!("{}", style("IoT energy sheets uploader").bold());
    println!("API URL:  {}", style(base_url).cyan());
    println!("Workbook: {}", style(file_path.display()).cyan());

    let endpoint = match action {
        "sheets" => "/api/workbooks/sheets",
        "summary" => "/api/readings/summary",
        _ => "/api/readings/parse",
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.blue} {msg}")?);
    pb.set_message("Uploading workbook...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let client = UploadClient::new(base_url)?;
    let result = match client.post_workbook(endpoint, file_path, &query).await {
        Ok(result) => {
            pb.finish_with_message("Upload complete");
            result
        }
        Err(e) => {
            pb.finish_with_message("Upload failed");
            return Err(e);
        }
    };

    match action {
        "sheets" => print_sheets(&result),
        "summary" => print_summary(&result),
        _ => print_parse(&result),
    }

    Ok(())
}
