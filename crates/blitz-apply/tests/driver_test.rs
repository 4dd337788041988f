mod common;

use blitz_apply::driver::SUBMISSION_FAILED;
use blitz_apply::ApplicationDriver;
use blitz_core::{
    AnswerSource, AppConfig, ApplicationStatus, AutomationConfig, CustomField, FieldType,
    Profile, ProfileAttribute, SubmissionMethod, UNKNOWN_COMPANY, UNKNOWN_POSITION,
};
use common::{FakeElement, FakeLauncher, FakePage};
use std::sync::Arc;

const JOB_URL: &str = "https://jobs.example.com/backend-engineer";

fn config() -> AppConfig {
    AppConfig {
        automation: AutomationConfig::without_delays(),
        ..AppConfig::default()
    }
}

fn driver(launcher: &Arc<FakeLauncher>) -> ApplicationDriver {
    ApplicationDriver::new(launcher.clone(), &config())
}

fn profile() -> Profile {
    Profile::new()
        .with(ProfileAttribute::FullName, "Jane Doe")
        .with(ProfileAttribute::Email, "jane@example.com")
        .with(ProfileAttribute::Phone, "555-0100")
        .with(ProfileAttribute::ResumeUrl, "https://drive.example.com/resume.pdf")
}

/// A posting with name, email and phone fields plus a submit button.
fn contact_form() -> (FakePage, usize) {
    let page = FakePage::new();
    let title = page.add(FakeElement::new("h1").text("  Backend Engineer "));
    let company = page.add(FakeElement::new("span").text("Acme Corp"));
    page.on("h1", &[title]);
    page.on(".company-name", &[company]);

    page.labeled("Full Name", "name", FakeElement::input("text"));
    page.labeled("Email Address", "email", FakeElement::input("email"));
    page.labeled("Phone Number", "phone", FakeElement::input("tel"));

    let submit = page.add(FakeElement::new("button").attr("type", "submit"));
    page.on("button[type='submit']", &[submit]);
    (page, submit)
}

#[tokio::test]
async fn test_all_fields_mapped_submits() {
    let (page, submit) = contact_form();
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Success);
    assert!(result.missing_fields.is_empty());
    assert_eq!(result.error_message, None);
    assert_eq!(result.company_name, "Acme Corp");
    assert_eq!(result.job_title, "Backend Engineer");
    assert_eq!(result.questions_answered, 3);

    let answers: Vec<_> = result
        .questions_and_answers
        .iter()
        .map(|qa| (qa.question.as_str(), qa.answer.as_str()))
        .collect();
    assert_eq!(
        answers,
        vec![
            ("Full Name", "Jane Doe"),
            ("Email Address", "jane@example.com"),
            ("Phone Number", "555-0100"),
        ]
    );
    assert!(result
        .questions_and_answers
        .iter()
        .all(|qa| qa.source == AnswerSource::Profile && qa.field_type == FieldType::Text));

    assert_eq!(
        result.submitted_via,
        Some(SubmissionMethod::Button {
            selector: "button[type='submit']".to_string()
        })
    );
    assert!(page.has_event(&format!("click:{submit}")));
    assert_eq!(page.close_count(), 1);
    assert_eq!(page.events().last().map(String::as_str), Some("close"));
}

#[tokio::test]
async fn test_unmapped_field_blocks_submission() {
    let (page, submit) = contact_form();
    page.labeled(
        "Why do you want to join us?",
        "motivation",
        FakeElement::new("textarea"),
    );
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Failed);
    assert_eq!(result.missing_fields, vec!["Why do you want to join us?"]);
    assert_eq!(
        result.error_message.as_deref(),
        Some("Missing required fields: Why do you want to join us?")
    );
    assert_eq!(result.questions_answered, 3);
    assert_eq!(result.submitted_via, None);
    assert!(!page.has_event(&format!("click:{submit}")));
    assert!(!page.has_event("key:Enter"));
    assert_eq!(page.close_count(), 1);
}

#[tokio::test]
async fn test_custom_answer_fills_field() {
    let (page, _) = contact_form();
    page.labeled("Availability Date", "available", FakeElement::input("date"));
    let launcher = Arc::new(FakeLauncher::new(page.clone()));
    let custom = vec![CustomField::new("Availability Date", "2024-01-15")];

    let result = driver(&launcher).apply(JOB_URL, &profile(), &custom).await;

    assert!(result.is_success());
    let availability = result
        .questions_and_answers
        .iter()
        .find(|qa| qa.question == "Availability Date")
        .unwrap();
    assert_eq!(availability.answer, "2024-01-15");
    assert_eq!(availability.source, AnswerSource::Custom);
}

#[tokio::test]
async fn test_skipped_resume_is_not_missing() {
    let (page, _) = contact_form();
    page.labeled("Resume", "resume", FakeElement::input("file"));
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert!(result.is_success());
    assert_eq!(result.questions_answered, 3);
    assert!(result.missing_fields.is_empty());
}

#[tokio::test]
async fn test_failed_fill_is_not_answered() {
    let (page, _) = contact_form();
    page.labeled(
        "Contact Email",
        "contact-email",
        FakeElement::input("email").failing(),
    );
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert!(result.is_success());
    assert_eq!(result.questions_answered, 3);
    assert!(result
        .questions_and_answers
        .iter()
        .all(|qa| qa.question != "Contact Email"));
}

#[tokio::test]
async fn test_navigation_failure_short_circuits() {
    let (page, _) = contact_form();
    page.unreachable(JOB_URL);
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Failed);
    assert_eq!(result.company_name, UNKNOWN_COMPANY);
    assert_eq!(result.job_title, UNKNOWN_POSITION);
    assert!(result.questions_and_answers.is_empty());
    assert!(result
        .error_message
        .as_deref()
        .is_some_and(|msg| msg.contains("net::ERR_NAME_NOT_RESOLVED")));
    assert!(page.events().iter().all(|e| !e.starts_with("fill:")));
    assert_eq!(page.close_count(), 1);
}

#[tokio::test]
async fn test_missing_job_info_uses_sentinels() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.company_name, UNKNOWN_COMPANY);
    assert_eq!(result.job_title, UNKNOWN_POSITION);
}

#[tokio::test]
async fn test_keyboard_fallback_when_no_submit_control() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert!(result.is_success());
    assert_eq!(result.submitted_via, Some(SubmissionMethod::KeyboardFallback));
    assert!(page.has_event("key:Enter"));
}

#[tokio::test]
async fn test_submission_failure_is_reported() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    page.fail_key_press();
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Failed);
    assert_eq!(result.error_message.as_deref(), Some(SUBMISSION_FAILED));
    assert_eq!(result.questions_answered, 1);
    assert!(result.missing_fields.is_empty());
    assert_eq!(page.close_count(), 1);
}

#[tokio::test]
async fn test_hidden_submit_is_passed_over_for_button_text() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let hidden = page.add(FakeElement::new("button").attr("type", "submit").hidden());
    let cancel = page.add(FakeElement::new("button").text("Cancel"));
    let apply = page.add(FakeElement::new("button").text("Apply now"));
    page.on("button[type='submit']", &[hidden]);
    page.on("button, [role='button']", &[cancel, apply]);
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(
        result.submitted_via,
        Some(SubmissionMethod::Button {
            selector: "button:contains('Apply')".to_string()
        })
    );
    assert!(page.has_event(&format!("click:{apply}")));
    assert!(!page.has_event(&format!("click:{hidden}")));
}

#[tokio::test]
async fn test_visible_caption_match_after_hidden_one_is_clicked() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let hidden = page.add(FakeElement::new("button").text("Apply").hidden());
    let visible = page.add(FakeElement::new("button").text("Apply for this job"));
    page.on("button, [role='button']", &[hidden, visible]);
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Success);
    assert_eq!(
        result.submitted_via,
        Some(SubmissionMethod::Button {
            selector: "button:contains('Apply')".to_string()
        })
    );
    assert!(page.has_event(&format!("click:{visible}")));
    assert!(!page.has_event(&format!("click:{hidden}")));
    assert!(!page.has_event("key:Enter"));
}

#[tokio::test]
async fn test_visible_selector_match_after_hidden_one_is_clicked() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let hidden = page.add(FakeElement::new("button").attr("type", "submit").hidden());
    let visible = page.add(FakeElement::new("button").attr("type", "submit"));
    page.on("button[type='submit']", &[hidden, visible]);
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(
        result.submitted_via,
        Some(SubmissionMethod::Button {
            selector: "button[type='submit']".to_string()
        })
    );
    assert!(page.has_event(&format!("click:{visible}")));
    assert!(!page.has_event(&format!("click:{hidden}")));
}

#[tokio::test]
async fn test_launch_failure_is_a_failed_result() {
    let launcher = Arc::new(FakeLauncher::broken());

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Failed);
    assert!(result
        .error_message
        .as_deref()
        .is_some_and(|msg| msg.starts_with("failed to launch browser")));
}

#[tokio::test]
async fn test_panic_still_closes_page() {
    let (page, _) = contact_form();
    page.panic_on_navigate();
    let launcher = Arc::new(FakeLauncher::new(page.clone()));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;

    assert_eq!(result.status, ApplicationStatus::Failed);
    assert!(result
        .error_message
        .as_deref()
        .is_some_and(|msg| msg.contains("renderer crashed")));
    assert_eq!(page.close_count(), 1);
}

#[tokio::test]
async fn test_batch_keeps_input_order() {
    let (page, _) = contact_form();
    let bad_url = "https://jobs.example.com/expired";
    page.unreachable(bad_url);
    let launcher = Arc::new(FakeLauncher::new(page.clone()));
    let urls = [JOB_URL, bad_url, "https://jobs.example.com/frontend"];

    let results = driver(&launcher)
        .with_max_concurrent(2)
        .apply_batch(&urls, &profile(), &[])
        .await;

    let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![
            ApplicationStatus::Success,
            ApplicationStatus::Failed,
            ApplicationStatus::Success,
        ]
    );
    assert_eq!(launcher.launches(), 3);
    assert_eq!(page.close_count(), 3);
}

#[tokio::test]
async fn test_batch_survives_launch_failures() {
    let launcher = Arc::new(FakeLauncher::broken());
    let urls = vec![JOB_URL.to_string(), "https://jobs.example.com/frontend".to_string()];

    let results = driver(&launcher).apply_batch(&urls, &profile(), &[]).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == ApplicationStatus::Failed));
}

#[tokio::test]
async fn test_result_serializes_submission_method() {
    let page = FakePage::new();
    page.labeled("Email", "email", FakeElement::input("email"));
    let launcher = Arc::new(FakeLauncher::new(page));

    let result = driver(&launcher).apply(JOB_URL, &profile(), &[]).await;
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["status"], "success");
    assert_eq!(json["submitted_via"]["method"], "keyboard_fallback");
    assert_eq!(json["questions_and_answers"][0]["source"], "profile");
    assert!(json.get("error_message").is_none());
}
