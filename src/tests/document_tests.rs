use super::{create_user, test_state};
use actix_web::http::{header, StatusCode};
use actix_web::test;
use serde_json::{json, Value};

#[actix_rt::test]
async fn test_document_lifecycle() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (owner, bearer) = create_user(&state, "owner@example.com");

    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "title": "  Meeting notes  ", "content": "Agenda" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["title"], "Meeting notes");
    assert_eq!(created["owner_id"], owner.id.as_str());
    assert_eq!(created["role"], "owner");
    let id = created["id"].as_str().unwrap().to_string();

    // The creator is registered as the owner collaborator
    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let collaborators: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(collaborators.as_array().unwrap().len(), 1);
    assert_eq!(collaborators[0]["role"], "owner");
    assert_eq!(collaborators[0]["email"], "owner@example.com");

    let req = test::TestRequest::put()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "content": "Agenda\nActions" }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["content"], "Agenda\nActions");
    assert_eq!(updated["title"], "Meeting notes");

    let req = test::TestRequest::patch()
        .uri(&format!("/documents/{}/", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Gone from the next list fetch
    let req = test::TestRequest::get()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert!(list.as_array().unwrap().is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_title_rules() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (_owner, bearer) = create_user(&state, "titles@example.com");

    for (title, status) in [
        ("Plan", StatusCode::CREATED),
        ("Plan", StatusCode::BAD_REQUEST),
        ("   ", StatusCode::BAD_REQUEST),
    ] {
        let req = test::TestRequest::post()
            .uri("/documents")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": title }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "title {:?}", title);
    }

    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(json!({ "title": "x".repeat(256) }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_reader_cannot_edit_or_delete() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (_owner, owner_bearer) = create_user(&state, "o@example.com");
    let (reader, reader_bearer) = create_user(&state, "r@example.com");
    let (_stranger, stranger_bearer) = create_user(&state, "s@example.com");

    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, owner_bearer.clone()))
        .set_json(json!({ "title": "Private" }))
        .to_request();
    let doc: Value = test::call_and_read_body_json(&app, req).await;
    let id = doc["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/documents/{}/collaborators", id))
        .insert_header((header::AUTHORIZATION, owner_bearer.clone()))
        .set_json(json!({ "user_id": reader.id, "role": "reader" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, reader_bearer.clone()))
        .to_request();
    let seen: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(seen["role"], "reader");

    let req = test::TestRequest::put()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, reader_bearer.clone()))
        .set_json(json!({ "content": "defaced" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::delete()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, reader_bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"].as_str().unwrap().contains("Your role: reader"));

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, stranger_bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_collaborator_management_rules() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (owner, bearer) = create_user(&state, "lead@example.com");
    let (editor, editor_bearer) = create_user(&state, "ed@example.com");

    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "title": "Team doc" }))
        .to_request();
    let doc: Value = test::call_and_read_body_json(&app, req).await;
    let id = doc["id"].as_str().unwrap().to_string();
    let uri = format!("/documents/{}/collaborators", id);

    let cases = [
        (json!({ "email": "ED@example.com", "role": "editor" }), StatusCode::CREATED),
        (json!({ "user_id": editor.id, "role": "reader" }), StatusCode::BAD_REQUEST),
        (json!({ "user_id": owner.id, "role": "reader" }), StatusCode::BAD_REQUEST),
        (json!({ "email": "ghost@example.com", "role": "reader" }), StatusCode::NOT_FOUND),
        (json!({ "role": "reader" }), StatusCode::BAD_REQUEST),
    ];
    for (body, status) in cases {
        let req = test::TestRequest::post()
            .uri(&uri)
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(&body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), status, "body {}", body);
    }

    // Editors can write but not manage collaborators
    let req = test::TestRequest::put()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, editor_bearer.clone()))
        .set_json(json!({ "content": "edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&format!("{}/{}", uri, owner.id))
        .insert_header((header::AUTHORIZATION, editor_bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::put()
        .uri(&format!("{}/{}", uri, owner.id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "role": "reader" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::put()
        .uri(&format!("{}/{}", uri, editor.id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "role": "reader" }))
        .to_request();
    let changed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(changed["role"], "reader");

    let req = test::TestRequest::delete()
        .uri(&format!("{}/{}", uri, editor.id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("{}/{}", uri, editor.id))
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_list_search_and_pagination() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (_user, bearer) = create_user(&state, "lists@example.com");

    for (title, content) in [("Alpha", "first"), ("Beta", "Second draft"), ("Gamma", "third")] {
        let req = test::TestRequest::post()
            .uri("/documents")
            .insert_header((header::AUTHORIZATION, bearer.clone()))
            .set_json(json!({ "title": title, "content": content }))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/documents?limit=2")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page.as_array().unwrap().len(), 2);
    assert_eq!(page[0]["title"], "Gamma", "Newest first");

    let req = test::TestRequest::get()
        .uri("/documents?limit=0")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/documents/search?q=DRAFT")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Beta");

    let req = test::TestRequest::get()
        .uri("/documents/search?q=%20")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri("/users/me/stats")
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let stats: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(stats["owned_documents"], 3);
    assert_eq!(stats["collaborations"], 0);
}

#[actix_rt::test]
async fn test_structured_document_export() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (_user, bearer) = create_user(&state, "export@example.com");

    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({
            "title": "Q3 plan",
            "content_blocks": [
                { "type": "heading1", "text": "Goals" },
                { "type": "paragraph", "content": [
                    { "text": "Ship " },
                    { "text": "<v2>", "styles": { "fontWeight": "bold" } }
                ]}
            ],
            "styles": { "fontSize": 14 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let doc: Value = test::read_body_json(resp).await;
    assert_eq!(doc["content_type"], "structured");
    let id = doc["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/export/txt", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("Q3_plan.txt"));
    let body = test::read_body(resp).await;
    assert_eq!(body, "Goals\nShip <v2>");

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/export/html", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<h1>Goals</h1>"));
    assert!(html.contains("<strong>&lt;v2&gt;</strong>"));

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/export/pdf", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Out-of-range styles are rejected
    let req = test::TestRequest::put()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(json!({ "styles": { "fontSize": 200 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_editor_style_values_are_stored_as_sent() {
    let (_dir, state) = test_state();
    let app = init_app!(state);
    let (_user, bearer) = create_user(&state, "styles@example.com");

    let blocks = json!([
        { "type": "paragraph", "content": [
            { "text": "Heavy", "styles": { "fontWeight": 700 } },
            { "text": " sized", "styles": { "fontSize": "16px" } }
        ], "styles": { "textAlign": "start" } }
    ]);
    let req = test::TestRequest::post()
        .uri("/documents")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "title": "Styled", "content_blocks": blocks }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let doc: Value = test::read_body_json(resp).await;
    assert_eq!(doc["content_blocks"], blocks);
    let id = doc["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}", id))
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let fetched: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched["content_blocks"], blocks);

    let req = test::TestRequest::get()
        .uri(&format!("/documents/{}/export/html", id))
        .insert_header((header::AUTHORIZATION, bearer))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<strong>Heavy</strong>"));
    assert!(html.contains("font-size: 16px"));
}
