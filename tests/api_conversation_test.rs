//! Integration tests for the conversation API endpoints

mod test_utils;

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::util::ServiceExt;

    use roundtable::core::Error;

    use crate::test_utils::{body_to_string, test_app, test_app_with_script};

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        serde_json::from_str(&body_to_string(response.into_body()).await).unwrap()
    }

    /// Tests a fresh conversation opens with the topic and each role
    /// speaks once per turn
    #[tokio::test]
    async fn it_runs_a_conversation() {
        let app = test_app_with_script(vec![
            Ok("Strong market fit.".to_string()),
            Ok("Feasible with a small team.".to_string()),
        ])
        .await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business", "technical"],
                    "max_turns": 1
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "user");
        assert!(
            messages[0]["content"]
                .as_str()
                .unwrap()
                .contains("Launch a recipe app")
        );
        assert_eq!(messages[1]["role"], "model");
        assert_eq!(messages[1]["speaker"], "Business Analyst");
        assert_eq!(messages[1]["content"], "Strong market fit.");
        assert_eq!(messages[2]["speaker"], "Technical Architect");
        assert_eq!(messages[2]["content"], "Feasible with a small team.");
    }

    /// Tests roles may be given by display name under the `roles` alias
    #[tokio::test]
    async fn it_accepts_role_names() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Four day work week",
                    "roles": ["Visionary", "Critical Thinker"],
                    "max_turns": 2
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 5);
    }

    /// Tests every role answers once when the history ends with the user
    #[tokio::test]
    async fn it_reacts_to_user_messages() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business", "customer", "technical"],
                    "conversation_history": [
                        {"role": "user", "content": "Let's discuss a recipe app."},
                        {"role": "model", "content": "Sounds good.", "speaker": "Business Analyst"}
                    ],
                    "user_input": "What about pricing?"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 6);
        assert_eq!(messages[2]["content"], "What about pricing?");
        assert_eq!(messages[3]["speaker"], "Business Analyst");
        assert_eq!(messages[4]["speaker"], "Customer Advocate");
        assert_eq!(messages[5]["speaker"], "Technical Architect");

        let prompts = app.model.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p.contains("What about pricing?")));
    }

    /// Tests only the requested speaker answers
    #[tokio::test]
    async fn it_runs_a_single_speaker() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business", "technical"],
                    "conversation_history": [
                        {"role": "user", "content": "Let's discuss a recipe app."}
                    ],
                    "next_speaker": "technical"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["speaker"], "Technical Architect");
    }

    /// Tests a speaker outside the active set is a 404 with the history
    /// left untouched
    #[tokio::test]
    async fn it_rejects_unknown_speakers() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business"],
                    "conversation_history": [
                        {"role": "user", "content": "Let's discuss a recipe app."}
                    ],
                    "next_speaker": "realizer"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    /// Tests an unknown role name is a 404
    #[tokio::test]
    async fn it_rejects_unknown_roles() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business", "astronaut"]
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert!(body["detail"].as_str().unwrap().contains("astronaut"));
    }

    /// Tests a model failure part way through returns what was generated
    #[tokio::test]
    async fn it_returns_partial_transcripts() {
        let app = test_app_with_script(vec![
            Ok("First answer.".to_string()),
            Err(Error::GenerationFailed("backend unavailable".to_string())),
        ])
        .await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business", "technical"],
                    "max_turns": 1
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(
            body["detail"]
                .as_str()
                .unwrap()
                .contains("backend unavailable")
        );
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["content"], "First answer.");
    }

    /// Tests zero max_tokens is rejected
    #[tokio::test]
    async fn it_rejects_zero_max_tokens() {
        let app = test_app().await;

        let response = app
            .router
            .oneshot(post_json(
                "/api/conversation",
                json!({
                    "topic": "Launch a recipe app",
                    "active_roles": ["business"],
                    "max_tokens": 0
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    /// Tests asking a single role a question
    #[tokio::test]
    async fn it_tests_a_role() {
        let app = test_app_with_script(vec![Ok("Usability first.".to_string())]).await;

        let response = app
            .router
            .clone()
            .oneshot(post_json(
                "/api/test-role",
                json!({"role": "Customer Advocate", "question": "What matters most?"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"]["role"], "Customer Advocate");
        assert_eq!(body["message"]["content"], "Usability first.");

        let response = app
            .router
            .oneshot(post_json(
                "/api/test-role",
                json!({"role_name": "astronaut", "question": "What matters most?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
