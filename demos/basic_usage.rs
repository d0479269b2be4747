use hireline_errors::validation::{validate_input, ValidationRule};
use hireline_errors::{
    create_file_upload_error, create_network_error, get_error_message, is_critical_error, is_retryable_error,
    normalize_error, FileUploadDetails, Result, UploadFailureReason,
};

fn submit_application(name: &str, email: &str) -> Result<()> {
    let name_rule = ValidationRule::new().required().max_length(80);
    let email_rule = ValidationRule::new().required().custom(|v| {
        (!v.contains('@')).then(|| "Please enter a valid email address".to_owned())
    });

    validate_input(&[("name", Some(name), &name_rule), ("email", Some(email), &email_rule)])?;
    Ok(())
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    // 1. Input validation stops at the first failing field.
    if let Err(err) = submit_application("Ada Lovelace", "ada.example.com") {
        let copy = get_error_message(&err);
        println!("1. [VALIDATION] {} / {}", err.code(), copy.message);
        println!("   Suggested action: {}", copy.action);
    }

    // 2. HTTP statuses map onto the taxonomy and decide retryability.
    println!("\n2. [NETWORK] status -> code");
    for status in [400, 401, 404, 429, 500, 503, 0] {
        let err = create_network_error(status, Some("/api/jobs"), Some("GET"), None);
        println!(
            "   {status:>3} -> {:<24} retryable={:<5} critical={}",
            err.code().as_str(),
            is_retryable_error(&err),
            is_critical_error(&err)
        );
    }

    // 3. Foreign errors are normalized with simple message heuristics.
    println!("\n3. [NORMALIZE]");
    let samples: Vec<Box<dyn std::error::Error + Send + Sync>> = vec![
        "fetch failed: ECONNRESET".into(),
        "Clerk: session token invalid".into(),
        "[CONVEX M(jobs:apply)] Server Error".into(),
        "index out of range".into(),
    ];
    for sample in samples {
        let text = sample.to_string();
        let err = normalize_error(sample);
        println!("   {text:<40} -> {}", err.code());
    }

    // 4. Upload failures carry the file facts for the toast copy.
    let err = create_file_upload_error(
        "resume.pdf",
        UploadFailureReason::Size,
        Some(FileUploadDetails {
            file_size: Some(12 * 1024 * 1024),
            max_file_size: Some(10 * 1024 * 1024),
            ..FileUploadDetails::default()
        }),
    );
    let copy = get_error_message(&err);
    println!("\n4. [UPLOAD] {}: {}", copy.title, copy.message);

    // 5. The serializable snapshot used by logs and reports.
    match serde_json::to_string_pretty(&err.info()) {
        Ok(json) => println!("\n5. [SNAPSHOT]\n{json}"),
        Err(e) => println!("\n5. [SNAPSHOT] failed: {e}"),
    }
}
