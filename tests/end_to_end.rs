/// End-to-end tests for the sheet-report binary
///
/// Each test writes a real workbook into a temp directory and runs the
/// compiled binary on it. Rows carry no photo URLs, so no network access
/// is needed.
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// Helper to write a form-style workbook; each row is (serial, photos, description)
fn write_workbook(dir: &Path, header: &[&str], rows: &[(f64, &str, &str)]) -> PathBuf {
    let path = dir.join("respostas.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (i, (serial, photos, description)) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_number(r, 0, *serial).unwrap();
        sheet.write_string(r, 1, *photos).unwrap();
        sheet.write_string(r, 2, *description).unwrap();
    }
    workbook.save(&path).unwrap();
    path
}

const HEADER: [&str; 3] = ["Carimbo de data/hora", "Foto", "Descrição"];

// Helper to run the binary with an empty config so the user's config is never read
fn run(dir: &TempDir, args: &[&str]) -> Output {
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();
    Command::new(env!("CARGO_BIN_EXE_sheet-report"))
        .arg("--config")
        .arg(&config)
        .arg("--console-width")
        .arg("120")
        .args(args)
        .current_dir(dir.path())
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to run sheet-report: {}", e))
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_full_run_writes_pdf() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path(), &HEADER, &[(45000.0, "", "leak detected"), (45301.5, "", "second entry")]);
    let pdf = dir.path().join("report.pdf");

    let output = run(&dir, &[input.to_str().unwrap(), "-o", pdf.to_str().unwrap()]);
    assert!(output.status.success(), "stdout: {}\nstderr: {}", stdout(&output), String::from_utf8_lossy(&output.stderr));

    let out = stdout(&output);
    assert!(out.contains("15/03/2023 00:00:00"));
    assert!(out.contains("leak detected"));
    assert!(out.contains("PDF generated successfully"));

    let bytes = std::fs::read(&pdf).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_date_filter_and_json_export() {
    let dir = TempDir::new().unwrap();
    // 45300.75 = 2024-01-09 18:00, 45301.39583 = 2024-01-10 09:30
    let input = write_workbook(dir.path(), &HEADER, &[(45300.75, "", "old"), (45301.395833, "", "new")]);
    let json = dir.path().join("rows.json");

    let output = run(
        &dir,
        &[
            input.to_str().unwrap(),
            "--start",
            "2024-01-10",
            "--end",
            "2024-01-10",
            "--no-pdf",
            "--json",
            json.to_str().unwrap(),
        ],
    );
    assert!(output.status.success(), "stdout: {}", stdout(&output));
    assert!(stdout(&output).contains("Showing 1 rows"));

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&json).unwrap()).unwrap();
    let rows = value["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][2], "new");
    assert!(rows[0][0].as_str().unwrap().starts_with("10/01/2024"));
    assert!(!dir.path().join("dados_personalizados.pdf").exists());
}

#[test]
fn test_missing_column_fails_without_pdf() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path(), &["Carimbo de data/hora", "Foto", "Observações"], &[(45000.0, "", "x")]);

    let output = run(&dir, &[input.to_str().unwrap(), "--no-table"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("\"descrição\""));
    assert!(!dir.path().join("dados_personalizados.pdf").exists());
}

#[test]
fn test_missing_input_file() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["does-not-exist.xlsx"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("File not found"));
}

#[test]
fn test_no_matches_leaves_nothing_to_report() {
    let dir = TempDir::new().unwrap();
    let input = write_workbook(dir.path(), &HEADER, &[(45000.0, "", "x")]);

    let output = run(&dir, &[input.to_str().unwrap(), "--start", "2030-01-01"]);
    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("No rows found for the selected dates"));
    assert!(out.contains("No filtered data to generate the PDF"));
}

#[test]
fn test_start_after_end_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = run(&dir, &["x.xlsx", "--start", "2024-02-01", "--end", "2024-01-01"]);
    assert_eq!(output.status.code(), Some(1));
}
