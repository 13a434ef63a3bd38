use super::common::*;
use crate::advisor::repository::{ChatRole, ConversationStore, FeedbackError, FeedbackSubmission};
use crate::advisor::{AdvisorServiceError, ChatRequest};

fn request(session_id: &str, message: &str) -> ChatRequest {
    ChatRequest {
        session_id: Some(session_id.to_string()),
        message: message.to_string(),
        deal: Some(deal()),
    }
}

#[test]
fn chat_builds_context_from_the_filtered_catalogue() {
    let (service, conversations, advisor) =
        build_service(ScriptedAdvisor::replying("Atlas fits at 50% LTV."), 5);

    let reply = service
        .chat(request("s1", "Who fits this deal?"))
        .expect("chat succeeds");

    assert_eq!(reply.response, "Atlas fits at 50% LTV.");
    assert_eq!(reply.eligible_count, Some(1));
    assert!(!reply.rate_limited);

    let prompt = advisor.prompts().pop().expect("advisor called");
    assert!(prompt.contains("### Atlas Bridging"));
    assert!(!prompt.contains("### Harbour Capital"));

    let history = service.history("s1").expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, ChatRole::User);
    assert_eq!(history[1].role, ChatRole::Assistant);
    assert_eq!(
        conversations.history("s1").expect("stored history").len(),
        2,
        "both turns are persisted"
    );
}

#[test]
fn chat_without_a_deal_asks_for_essentials() {
    let (service, _, advisor) = build_service(ScriptedAdvisor::replying("Need more detail."), 5);

    let reply = service
        .chat(ChatRequest {
            session_id: None,
            message: "Hello".to_string(),
            deal: None,
        })
        .expect("chat succeeds");

    assert!(reply.session_id.starts_with("session-"));
    assert_eq!(reply.eligible_count, None);
    let prompt = advisor.prompts().pop().expect("advisor called");
    assert!(prompt.contains("No deal parameters supplied yet"));
}

#[test]
fn rate_limited_sessions_get_a_fixed_reply() {
    let (service, _, advisor) = build_service(ScriptedAdvisor::replying("ok"), 1);

    service.chat(request("s1", "first")).expect("first chat");
    let reply = service.chat(request("s1", "second")).expect("second chat");

    assert!(reply.rate_limited);
    assert_eq!(
        reply.response,
        "Rate limit reached (1 queries/hour). Please wait before sending more queries."
    );
    assert_eq!(advisor.prompts().len(), 1);

    let other = service.chat(request("s2", "first")).expect("other session");
    assert!(!other.rate_limited);
}

#[test]
fn upstream_failures_become_the_reply() {
    let (service, _, _) = build_service(ScriptedAdvisor::failing("timeout"), 5);

    let reply = service.chat(request("s1", "Who fits?")).expect("chat succeeds");

    assert_eq!(
        reply.response,
        "I encountered an error communicating with the AI service: timeout"
    );
    assert_eq!(reply.eligible_count, Some(1));
    assert!(service.history("s1").expect("history").is_empty());
}

#[test]
fn unconfigured_advisor_explains_how_to_enable_it() {
    let (service, _, _) = build_service(ScriptedAdvisor::unconfigured(), 5);

    assert!(!service.is_available());
    let reply = service.chat(request("s1", "Who fits?")).expect("chat succeeds");
    assert!(reply.response.contains("ADVISOR_API_KEY"));
}

#[test]
fn blank_messages_are_rejected() {
    let (service, _, advisor) = build_service(ScriptedAdvisor::replying("ok"), 5);

    let error = service.chat(request("s1", "   ")).expect_err("blank message");
    assert!(matches!(error, AdvisorServiceError::EmptyMessage));
    assert!(advisor.prompts().is_empty());
}

#[test]
fn feedback_is_validated_and_feeds_later_context() {
    let (service, _, advisor) = build_service(ScriptedAdvisor::replying("ok"), 5);

    let rejected = service.submit_feedback(FeedbackSubmission {
        lender_name: "Atlas Bridging".to_string(),
        deal_type: "purchase".to_string(),
        rating: 7,
        feedback_text: None,
    });
    assert!(matches!(
        rejected,
        Err(AdvisorServiceError::Feedback(FeedbackError::RatingOutOfRange(7)))
    ));

    service
        .submit_feedback(FeedbackSubmission {
            lender_name: "Atlas Bridging".to_string(),
            deal_type: "purchase".to_string(),
            rating: 5,
            feedback_text: Some("Valuation in four days".to_string()),
        })
        .expect("feedback saved");

    let stored = service
        .feedback(Some("Atlas Bridging"), 10)
        .expect("feedback listed");
    assert_eq!(stored.len(), 1);

    service.chat(request("s1", "Any feedback?")).expect("chat");
    let prompt = advisor.prompts().pop().expect("advisor called");
    assert!(prompt.contains("- Atlas Bridging: 5/5 stars - \"Valuation in four days\""));
}

#[test]
fn new_sessions_are_unique() {
    let (service, _, _) = build_service(ScriptedAdvisor::replying("ok"), 5);
    assert_ne!(service.new_session(), service.new_session());
}
