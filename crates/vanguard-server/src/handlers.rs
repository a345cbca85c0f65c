//! Request handlers, one per protocol endpoint.

use actix_web::{web, HttpResponse, Responder};

use crate::dto::{
    ActionRequest, ActionResponse, DestroyRequest, EndRequest, SessionCountsDto, StatusResponse,
};
use crate::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/agent/action", web::post().to(action))
        .route("/agent/destroy", web::post().to(destroy))
        .route("/agent/end", web::post().to(end));
}

/// Liveness and identity probe. No side effects.
async fn index(state: web::Data<AppState>) -> impl Responder {
    let status = state.runtime.status();
    HttpResponse::Ok().json(StatusResponse {
        name: state.name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        status: "ready",
        weapon_backend: status.weapon_backend,
        degraded_reason: status.degraded_reason,
        sessions: SessionCountsDto {
            active: status.sessions.active,
            destroyed_total: status.sessions.destroyed_total,
            ended_total: status.sessions.ended_total,
        },
    })
}

/// One decision tick. Unknown identifiers create a session; destroyed or
/// ended identifiers silently start a fresh episode. Always answers with a
/// fully-formed action.
async fn action(state: web::Data<AppState>, req: web::Json<ActionRequest>) -> impl Responder {
    let outcome = state.runtime.act(&req.session_id, &req.observation);
    HttpResponse::Ok().json(ActionResponse {
        action: outcome.action,
        mode: if outcome.aim_applied { "neural" } else { "coarse" },
        degraded: state.degraded,
    })
}

/// Unit removed from the world. Idempotent.
async fn destroy(state: web::Data<AppState>, req: web::Json<DestroyRequest>) -> impl Responder {
    state.runtime.destroy(&req.session_id);
    HttpResponse::NoContent().finish()
}

/// Episode boundary, for one session or for all of them.
async fn end(state: web::Data<AppState>, req: web::Json<EndRequest>) -> impl Responder {
    state.runtime.end(req.session_id.as_deref());
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use vanguard_agent::{AgentConfig, AgentRuntime};

    fn state() -> web::Data<AppState> {
        let mut config = AgentConfig::default();
        config.map.width = 10;
        config.map.height = 10;
        let runtime = AgentRuntime::build(config).unwrap();
        web::Data::new(AppState {
            name: "vanguard-test".to_owned(),
            degraded: false,
            runtime,
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(configure)).await
        };
    }

    fn action_body(session_id: &str) -> Value {
        json!({
            "session_id": session_id,
            "tick": 1,
            "pose": { "x": 2.5, "y": 2.5, "heading_deg": 0.0 },
            "target": { "x": 42.5, "y": 2.5, "line_of_sight": true }
        })
    }

    #[actix_web::test]
    async fn probe_reports_identity_and_backend() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["name"], "vanguard-test");
        assert_eq!(body["status"], "ready");
        assert_eq!(body["weapon_backend"], "coarse-only");
        assert_eq!(body["sessions"]["active"], 0);
    }

    #[actix_web::test]
    async fn action_returns_a_well_formed_command() {
        let state = state();
        let app = app!(state);
        let req = test::TestRequest::post()
            .uri("/agent/action")
            .set_json(action_body("alpha"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        assert!(body["movement"]["throttle"].is_f64() || body["movement"]["throttle"].is_i64());
        assert!(body["movement"]["steering"].is_number());
        assert!(body["fire"].is_boolean());
        assert!(body["turret_delta"]["bearing_deg"].is_number());
        assert!(body["turret_delta"]["elevation_deg"].is_number());
        assert_eq!(body["mode"], "coarse");
        assert_eq!(body["degraded"], false);
    }

    #[actix_web::test]
    async fn malformed_map_report_answers_with_the_safe_noop() {
        let state = state();
        let app = app!(state);
        let mut body = action_body("alpha");
        body["map"] = json!({
            "width": 10,
            "height": 10,
            "blocked": [{ "x": 99, "y": 99 }]
        });
        let req = test::TestRequest::post()
            .uri("/agent/action")
            .set_json(body)
            .to_request();
        let response: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(response["movement"]["throttle"], 0.0);
        assert_eq!(response["movement"]["steering"], 0.0);
        assert_eq!(response["fire"], false);
        assert_eq!(response["turret_delta"]["bearing_deg"], 0.0);
    }

    #[actix_web::test]
    async fn destroy_then_action_reinitializes_the_session() {
        let state = state();
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/agent/action")
            .set_json(action_body("alpha"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::post()
            .uri("/agent/destroy")
            .set_json(json!({ "session_id": "alpha" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

        // Destroying twice is a quiet no-op.
        let req = test::TestRequest::post()
            .uri("/agent/destroy")
            .set_json(json!({ "session_id": "alpha" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

        // The same identifier serves again as a fresh episode.
        let req = test::TestRequest::post()
            .uri("/agent/action")
            .set_json(action_body("alpha"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["sessions"]["active"], 1);
        assert_eq!(body["sessions"]["destroyed_total"], 1);
    }

    #[actix_web::test]
    async fn end_without_an_id_ends_every_session() {
        let state = state();
        let app = app!(state);

        for id in ["alpha", "bravo"] {
            let req = test::TestRequest::post()
                .uri("/agent/action")
                .set_json(action_body(id))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = test::TestRequest::post()
            .uri("/agent/end")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::NO_CONTENT);

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["sessions"]["active"], 0);
        assert_eq!(body["sessions"]["ended_total"], 2);
    }
}
