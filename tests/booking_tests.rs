mod common;

use axum::http::{Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn create_and_list_bookings() {
    let app = spawn_app().await;
    let (user_id, token) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;

    let booking_id = app.create_booking(&token, room_id).await;

    let (status, body) = app.get("/api/bookings/mine", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let bookings = body["data"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["id"], booking_id);
    assert_eq!(bookings[0]["user_id"], user_id);
    assert_eq!(bookings[0]["payment_status"], "Pending");

    // Other users see only their own.
    let (_, other) = app.register_and_login("bob", "bob@example.com").await;
    let (_, body) = app.get("/api/bookings/mine", Some(&other)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_booking_rejects_bad_input() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;
    let tomorrow = chrono::Utc::now() + chrono::Duration::days(1);

    let (status, _) = app
        .post(
            "/api/bookings",
            Some(&token),
            json!({
                "hotel_room_id": room_id,
                "check_in_date": tomorrow.to_rfc3339(),
                "check_out_date": tomorrow.to_rfc3339(),
                "guests": 1,
                "rooms": 1,
                "total_price_cents": 18_000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/bookings",
            Some(&token),
            json!({
                "hotel_room_id": 9999,
                "check_in_date": tomorrow.to_rfc3339(),
                "check_out_date": (tomorrow + chrono::Duration::days(1)).to_rfc3339(),
                "guests": 1,
                "rooms": 1,
                "total_price_cents": 18_000,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_sends_booking_to_gateway() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;
    let booking_id = app.create_booking(&token, room_id).await;

    let (status, body) = app
        .post(
            &format!("/api/bookings/{booking_id}/checkout"),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["session_id"], format!("cs_test_{booking_id}"));

    let requests = app.gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].booking_id, booking_id);
    assert_eq!(requests[0].amount_cents, 36_000);
    assert_eq!(requests[0].description, "Grand Harbor - Deluxe King");
}

#[tokio::test]
async fn strangers_cannot_touch_a_booking() {
    let app = spawn_app().await;
    let (_, owner) = app.register_and_login("alice", "alice@example.com").await;
    let (_, stranger) = app.register_and_login("mallory", "mallory@example.com").await;
    let room_id = app.seed_room().await;
    let booking_id = app.create_booking(&owner, room_id).await;

    let (status, _) = app
        .post(
            &format!("/api/bookings/{booking_id}/cancel"),
            Some(&stranger),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .post(
            &format!("/api/bookings/{booking_id}/checkout"),
            Some(&stranger),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/bookings/{booking_id}"),
            Some(&stranger),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(app.gateway.requests().is_empty());
}

#[tokio::test]
async fn cancelled_booking_cannot_be_paid() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;
    let booking_id = app.create_booking(&token, room_id).await;

    let (status, body) = app
        .post(
            &format!("/api/bookings/{booking_id}/cancel"),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["payment_status"], "Cancelled");

    let (status, _) = app
        .post(
            &format!("/api/bookings/{booking_id}/checkout"),
            Some(&token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(common::checkout_completed_request("evt_late", booking_id))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let booking = app.state.store().get_booking(booking_id).await.unwrap().unwrap();
    assert_eq!(booking.payment_status.as_str(), "Cancelled");
}

#[tokio::test]
async fn owner_can_delete_booking() {
    let app = spawn_app().await;
    let (_, token) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;
    let booking_id = app.create_booking(&token, room_id).await;

    let uri = format!("/api/bookings/{booking_id}");
    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let app = spawn_app().await;
    let (_, user) = app.register_and_login("alice", "alice@example.com").await;
    let admin = app.admin_token("root@example.com").await;
    let room_id = app.seed_room().await;
    app.create_booking(&user, room_id).await;

    for uri in ["/api/bookings", "/api/users", "/api/activity-log"] {
        let (status, _) = app.get(uri, Some(&user)).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} should be admin-only");

        let (status, _) = app.get(uri, Some(&admin)).await;
        assert_eq!(status, StatusCode::OK, "{uri} should be open to admins");
    }

    let (_, body) = app.get("/api/bookings", Some(&admin)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .get("/api/activity-log?page=1&page_size=5", Some(&admin))
        .await;
    assert_eq!(body["data"]["page_size"], 5);
    assert!(!body["data"]["items"].as_array().unwrap().is_empty());

    let (status, _) = app
        .get("/api/activity-log?page=0", Some(&admin))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_deletes_users_but_not_themselves() {
    let app = spawn_app().await;
    let (user_id, user) = app.register_and_login("alice", "alice@example.com").await;
    let room_id = app.seed_room().await;
    app.create_booking(&user, room_id).await;
    let admin = app.admin_token("root@example.com").await;

    let (_, body) = app.get("/api/auth/me", Some(&admin)).await;
    let admin_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/users/{admin_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/users/{user_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/users", Some(&admin)).await;
    let users = body["data"].as_array().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["role"], "admin");

    let (_, body) = app.get("/api/bookings", Some(&admin)).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _) = app
        .request(Method::DELETE, &format!("/api/users/{user_id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wishlist_add_list_and_remove() {
    let app = spawn_app().await;
    let (_, owner) = app.register_and_login("alice", "alice@example.com").await;
    let (_, stranger) = app.register_and_login("bob", "bob@example.com").await;
    let room_id = app.seed_room().await;

    let (status, body) = app
        .post("/api/wishlist", Some(&owner), json!({ "hotel_room_id": room_id }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let item_id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .post("/api/wishlist", Some(&owner), json!({ "hotel_room_id": room_id }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post("/api/wishlist", Some(&owner), json!({ "hotel_room_id": 9999 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.get("/api/wishlist", Some(&owner)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let uri = format!("/api/wishlist/{item_id}");
    let (status, _) = app.request(Method::DELETE, &uri, Some(&stranger), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::DELETE, &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get("/api/wishlist", Some(&owner)).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn room_lookup_is_public() {
    let app = spawn_app().await;
    let room_id = app.seed_room().await;

    let (status, body) = app.get(&format!("/api/hotel-rooms/{room_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hotel_name"], "Grand Harbor");

    let (status, _) = app.get("/api/hotel-rooms/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.get("/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}
