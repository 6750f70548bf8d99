mod common;

use std::net::TcpListener;

use common::Harness;
use erp_client::http::{Level, messages};
use erp_client::{Error, FailureKind};
use httpmock::prelude::*;
use serde_json::{Value, json};

#[tokio::test]
async fn attaches_bearer_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(Method::GET)
            .path("/empresas")
            .header("authorization", "Bearer tok-1");
        then.status(200).json_body(json!([{"id": 1}]));
    });

    let h = Harness::new(&server.base_url()).logged_in("tok-1");
    let body: Value = h.client.get("/empresas").await.unwrap();

    assert_eq!(body, json!([{"id": 1}]));
    assert_eq!(mock.calls(), 1);
    assert!(h.toasts.is_empty());
}

#[tokio::test]
async fn keeps_base_path_prefix() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(Method::GET).path("/api/auth/profile");
        then.status(200).json_body(json!({"id": 1, "nome": "Ana"}));
    });

    let h = Harness::new(&format!("{}/api", server.base_url()));
    let _: Value = h.client.get("/auth/profile").await.unwrap();
    assert_eq!(mock.calls(), 1);
}

#[tokio::test]
async fn rejected_login_keeps_session_and_shows_server_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::POST).path("/auth/login");
        then.status(401).json_body(json!({"message": "Senha incorreta"}));
    });

    let h = Harness::new(&server.base_url()).logged_in("tok-1");
    let err = h
        .client
        .post::<Value, _>("/auth/login", &json!({"email": "a", "password": "b"}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::CredentialsRejected));
    assert!(h.session().is_authenticated());
    assert_eq!(h.navigator.count(), 0);
    assert_eq!(h.messages(), vec!["Senha incorreta".to_string()]);
}

#[tokio::test]
async fn rejected_login_without_message_uses_generic_text() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::POST).path("/auth/login");
        then.status(401);
    });

    let h = Harness::new(&server.base_url());
    let _ = h.client.post::<Value, _>("/auth/login?next=x", &json!({})).await;
    assert_eq!(h.messages(), vec![messages::INVALID_CREDENTIALS.to_string()]);
}

#[tokio::test]
async fn expired_session_logs_out_once_and_redirects() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::GET).path("/empresas/5/contas");
        then.status(401).json_body(json!({"message": "jwt expired"}));
    });

    let h = Harness::new(&server.base_url()).logged_in("stale");
    assert!(h.scoped_record().is_some());

    let err = h.client.get::<Value>("/empresas/5/contas").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::SessionExpired));
    assert!(!h.session().is_authenticated());
    assert!(h.session().token().is_none());
    assert!(h.scoped_record().is_none());
    assert!(h.durable_record().is_none());
    assert_eq!(h.navigator.count(), 1);
    assert_eq!(h.navigator.routes(), vec!["/login".to_string()]);

    let toasts = h.toasts.drain();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].level, Level::Warning);
    assert_eq!(toasts[0].message, messages::SESSION_EXPIRED);
}

#[tokio::test]
async fn expired_remembered_session_removes_durable_cookie() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::GET).path("/empresas/5/contas");
        then.status(401).json_body(json!({"message": "jwt expired"}));
    });

    let h = Harness::new(&server.base_url()).logged_in_remembered("stale");
    assert!(h.durable_record().is_some());
    assert!(h.scoped_record().is_none());

    let err = h.client.get::<Value>("/empresas/5/contas").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::SessionExpired));
    assert!(!h.session().is_authenticated());
    assert!(h.durable_record().is_none());
    assert!(h.scoped_record().is_none());
    assert_eq!(h.navigator.count(), 1);
    assert_eq!(h.messages(), vec![messages::SESSION_EXPIRED.to_string()]);
}

#[tokio::test]
async fn unauthorized_on_unlisted_auth_path_is_session_expiry() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::GET).path("/auth/profile");
        then.status(401);
    });

    let h = Harness::new(&server.base_url()).logged_in("stale");
    let err = h.client.get::<Value>("/auth/profile").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::SessionExpired));
    assert!(!h.session().is_authenticated());
}

#[tokio::test]
async fn validation_errors_notify_each_field_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::POST).path("/empresas/5/funcionarios");
        then.status(422).json_body(json!({
            "message": "Dados inválidos",
            "errors": {"nome": "Nome é obrigatório", "email": ["E-mail já cadastrado"]}
        }));
    });

    let h = Harness::new(&server.base_url()).logged_in("tok");
    let err = h
        .client
        .post::<Value, _>("/empresas/5/funcionarios", &json!({}))
        .await
        .unwrap_err();

    let api = err.api().unwrap();
    assert_eq!(api.kind, FailureKind::Validation);
    assert_eq!(api.status, 422);
    assert_eq!(api.field_errors["nome"], vec!["Nome é obrigatório".to_string()]);

    let mut toasts = h.toasts.drain();
    toasts.sort_by(|a, b| a.field.cmp(&b.field));
    assert_eq!(toasts.len(), 2);
    assert_eq!(toasts[0].field.as_deref(), Some("email"));
    assert_eq!(toasts[0].message, "E-mail já cadastrado");
    assert_eq!(toasts[1].field.as_deref(), Some("nome"));
    assert_eq!(toasts[1].message, "Nome é obrigatório");
    assert!(h.session().is_authenticated());
}

#[tokio::test]
async fn generic_messages_for_forbidden_not_found_and_server_errors() {
    let server = MockServer::start();
    for (path, status) in [("/forbidden", 403), ("/missing", 404), ("/boom", 500), ("/down", 503)] {
        server.mock(|when, then| {
            when.method(Method::GET).path(path);
            then.status(status).json_body(json!({"message": "detalhe interno"}));
        });
    }

    let h = Harness::new(&server.base_url()).logged_in("tok");
    let mut kinds = Vec::new();
    for path in ["/forbidden", "/missing", "/boom", "/down"] {
        let err = h.client.get::<Value>(path).await.unwrap_err();
        kinds.push(err.kind().unwrap());
    }

    assert_eq!(
        kinds,
        vec![
            FailureKind::Forbidden,
            FailureKind::NotFound,
            FailureKind::Server,
            FailureKind::Server
        ]
    );
    assert_eq!(
        h.messages(),
        vec![
            messages::FORBIDDEN.to_string(),
            messages::NOT_FOUND.to_string(),
            messages::SERVER_ERROR.to_string(),
            messages::SERVER_ERROR.to_string(),
        ]
    );
    assert!(h.session().is_authenticated());
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn other_client_errors_surface_server_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::DELETE).path("/empresas/5");
        then.status(409).json_body(json!({"message": "Empresa possui funcionários"}));
    });

    let h = Harness::new(&server.base_url());
    let err = h.client.delete::<Value>("/empresas/5").await.unwrap_err();

    assert_eq!(err.kind(), Some(FailureKind::Rejected));
    assert_eq!(h.messages(), vec!["Empresa possui funcionários".to_string()]);
}

#[tokio::test]
async fn unreachable_server_is_a_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let h = Harness::new(&format!("http://127.0.0.1:{port}")).logged_in("tok");
    let err = h.client.get::<Value>("/empresas").await.unwrap_err();

    assert!(matches!(err, Error::Network(_)), "{err:?}");
    assert_eq!(err.kind(), None);
    assert_eq!(h.messages(), vec![messages::NO_RESPONSE.to_string()]);
    assert!(h.session().is_authenticated());
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::DELETE).path("/cargos/3");
        then.status(204);
    });

    let h = Harness::new(&server.base_url());
    let () = h.client.delete("/cargos/3").await.unwrap();
    assert!(h.toasts.is_empty());
}

#[tokio::test]
async fn undecodable_success_body_is_a_request_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(Method::GET).path("/cargos");
        then.status(200).body("<html>");
    });

    let h = Harness::new(&server.base_url());
    let err = h.client.get::<Value>("/cargos").await.unwrap_err();

    assert!(matches!(err, Error::Request(_)), "{err:?}");
    assert_eq!(h.messages(), vec![messages::REQUEST_FAILED.to_string()]);
}

#[tokio::test]
async fn query_parameters_are_sent() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(Method::GET)
            .path("/usuarios")
            .query_param("page", "2")
            .query_param("search", "ana");
        then.status(200).json_body(json!([]));
    });

    let h = Harness::new(&server.base_url());
    let _: Value = h
        .client
        .get_with_query("/usuarios", &[("page", "2"), ("search", "ana")])
        .await
        .unwrap();
    assert_eq!(mock.calls(), 1);
}
