//! Integration tests for the scheduling API endpoint

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use crate::test_utils::{
        BUDGET_CALL, CREATED_EVENT, ollama_reply, test_app, test_env, test_env_without_token,
    };

    fn schedule_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/schedule-meeting")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Tests a prompt flows through extraction, calendar and email
    #[tokio::test]
    async fn it_schedules_a_meeting() {
        let mut env = test_env().await;
        let chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ollama_reply(&format!("Here it is: {}", BUDGET_CALL)))
            .expect(1)
            .create_async()
            .await;
        let insert = env
            .google
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::UrlEncoded(
                "sendUpdates".to_string(),
                "all".to_string(),
            ))
            .match_header("authorization", "Bearer test_access_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(CREATED_EVENT)
            .expect(1)
            .create_async()
            .await;
        let send = env
            .google
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "msg_001", "threadId": "thr_001"}"#)
            .expect(1)
            .create_async()
            .await;

        let app = test_app(env.config.clone());
        let response = app
            .oneshot(schedule_request(
                r#"{"prompt": "Schedule a call with a@x.com tomorrow 3pm for 45 minutes about budget"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Meeting scheduled successfully");
        assert_eq!(
            body["event_link"],
            "https://www.google.com/calendar/event?eid=evt_001"
        );
        assert_eq!(body["meeting_details"]["participants"], json!(["a@x.com"]));
        assert_eq!(body["meeting_details"]["duration_minutes"], 45);

        chat.assert_async().await;
        insert.assert_async().await;
        send.assert_async().await;
    }

    /// Tests an event without a link still succeeds with a null link
    #[tokio::test]
    async fn it_returns_null_link_when_provider_omits_it() {
        let mut env = test_env().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(ollama_reply(
                r#"{"title":"Solo","participants":[],"start_time":"2025-08-16T15:00:00","duration_minutes":30,"agenda":""}"#,
            ))
            .create_async()
            .await;
        let _insert = env
            .google
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"id": "evt_002"}"#)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "Block focus time tomorrow 3pm"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["event_link"], Value::Null);
    }

    /// Tests a reply with no JSON object is a 400 malformed_extraction
    #[tokio::test]
    async fn it_returns_400_for_malformed_extraction() {
        let mut env = test_env().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(ollama_reply("Sorry, I can't help with that."))
            .create_async()
            .await;
        let insert = env
            .google
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "gibberish"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "malformed_extraction");
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("No JSON found in model response")
        );
        insert.assert_async().await;
    }

    /// Tests a missing start time is a 400 schema_violation
    #[tokio::test]
    async fn it_returns_400_for_schema_violation() {
        let mut env = test_env().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(ollama_reply(
                r#"{"title":"Sync","participants":[],"duration_minutes":30}"#,
            ))
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "sync sometime"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "schema_violation");
        assert_eq!(body["detail"], "start_time is required");
    }

    /// Tests the inference server being down is a 400 upstream_unavailable
    #[tokio::test]
    async fn it_returns_400_when_inference_is_unavailable() {
        let mut env = test_env().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(503)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "sync tomorrow"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "upstream_unavailable");
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .starts_with("Ollama request failed")
        );
    }

    /// Tests a calendar API failure surfaces the provider's error text
    #[tokio::test]
    async fn it_returns_400_when_calendar_rejects_the_event() {
        let mut env = test_env().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(ollama_reply(BUDGET_CALL))
            .create_async()
            .await;
        let _insert = env
            .google
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "Insufficient Permission"}}"#)
            .create_async()
            .await;
        let send = env
            .google
            .mock("POST", "/gmail/v1/users/me/messages/send")
            .expect(0)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "budget call tomorrow"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["kind"], "upstream_unavailable");
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("Insufficient Permission")
        );
        send.assert_async().await;
    }

    /// Tests a missing token with consent disabled never calls the calendar
    #[tokio::test]
    async fn it_returns_400_for_missing_credentials() {
        let mut env = test_env_without_token().await;
        let _chat = env
            .ollama
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(ollama_reply(BUDGET_CALL))
            .create_async()
            .await;
        let insert = env
            .google
            .mock("POST", "/calendar/v3/calendars/primary/events")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"prompt": "budget call tomorrow"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "credential_error");
        insert.assert_async().await;
    }

    /// Tests a body without a prompt is rejected before any call
    #[tokio::test]
    async fn it_returns_400_for_missing_prompt() {
        let mut env = test_env().await;
        let chat = env
            .ollama
            .mock("POST", "/api/chat")
            .expect(0)
            .create_async()
            .await;

        let response = test_app(env.config.clone())
            .oneshot(schedule_request(r#"{"text": "hello"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["kind"], "invalid_input");
        chat.assert_async().await;
    }

    /// Tests only POST is routed
    #[tokio::test]
    async fn it_returns_405_for_get() {
        let env = test_env().await;
        let response = test_app(env.config.clone())
            .oneshot(
                Request::builder()
                    .uri("/schedule-meeting")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
