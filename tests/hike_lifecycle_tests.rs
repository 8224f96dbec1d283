// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hike create/read/end through the HTTP API.

use axum::http::{Method, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use hike_tracker::models::HikeStatus;
use serde_json::json;

mod common;
use common::{create_hike, create_test_app, send, test_new_hike, test_user};

#[tokio::test]
async fn test_create_hike_returns_both_codes() {
    let (app, state) = create_test_app().await;
    let new_hike = test_new_hike("Sunrise Hike", 21.3325, -157.8005, Utc::now());

    let created = create_hike(&app, &new_hike).await;

    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();
    assert_eq!(join_code.len(), 22);
    assert_eq!(leader_code.len(), 22);
    assert_ne!(join_code, leader_code);
    assert_eq!(created["name"], "Sunrise Hike");
    assert_eq!(created["status"], "open");
    assert_eq!(created["leader"]["name"], "Leilani");
    assert_eq!(created["trailheadName"], "Manoa Falls");
    // Create echoes the raw Markdown
    assert_eq!(created["description"], "Bring **water**.");

    let status = state.db.hike_status(join_code).await.unwrap();
    assert_eq!(status, Some(HikeStatus::Open));
}

#[tokio::test]
async fn test_create_hike_rejects_undecodable_payload() {
    let (app, _) = create_test_app().await;

    let response = send(
        &app,
        Method::POST,
        "/api/hike",
        Some(json!({ "name": "No leader or coordinates" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"], "bad_request");

    let response = send(&app, Method::POST, "/api/hike", Some(json!("not an object"))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_hike_accepts_loose_values() {
    let (app, _) = create_test_app().await;
    // Empty name, out-of-range coordinates and a past start are all accepted.
    let new_hike = test_new_hike("", 123.0, -500.0, Utc::now() - Duration::days(30));

    let created = create_hike(&app, &new_hike).await;
    assert_eq!(created["name"], "");
    assert_eq!(created["latitude"], 123.0);
}

#[tokio::test]
async fn test_get_hike_by_join_code_hides_leader_code() {
    let (app, _) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Ridge", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    let response = send(&app, Method::GET, &format!("/api/hike/{join_code}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains(leader_code));

    let hike = response.json();
    assert_eq!(hike["joinCode"], join_code);
    assert!(hike.get("leaderCode").is_none());
    assert_eq!(hike["description"], "<p>Bring <strong>water</strong>.</p>\n");
}

#[tokio::test]
async fn test_get_hike_by_leader_code_query() {
    let (app, _) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Ridge", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    let response = send(
        &app,
        Method::GET,
        &format!("/api/hike/ignored?leaderCode={leader_code}"),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains(leader_code));
    assert_eq!(response.json()["joinCode"], join_code);
}

#[tokio::test]
async fn test_get_unknown_hike_is_not_found() {
    let (app, _) = create_test_app().await;

    let response = send(&app, Method::GET, "/api/hike/no-such-code", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, Method::GET, "/api/hike/x?leaderCode=no-such-code", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_end_hike_is_idempotent_and_cascades() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap().to_string();
    let leader_code = created["leaderCode"].as_str().unwrap().to_string();

    for (uuid, name) in [("p-a", "Alana"), ("p-b", "Bo"), ("p-c", "Cy")] {
        let response = send(
            &app,
            Method::POST,
            &format!("/api/hike/{join_code}/participant"),
            Some(json!({ "user": test_user(uuid, name) })),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    // Already done before the leader ends the hike.
    state
        .participants
        .update_status(&join_code, "p-c", "completed")
        .await
        .unwrap();

    let end_body = json!({ "leaderCode": leader_code, "joinCode": join_code });
    for _ in 0..2 {
        let response = send(
            &app,
            Method::PUT,
            &format!("/api/hike/{leader_code}"),
            Some(end_body.clone()),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);

        assert_eq!(
            state.db.hike_status(&join_code).await.unwrap(),
            Some(HikeStatus::Closed)
        );
        let statuses: Vec<(String, String)> = state
            .participants
            .list(&leader_code)
            .await
            .unwrap()
            .into_iter()
            .map(|p| (p.user.uuid, p.status))
            .collect();
        assert_eq!(statuses.len(), 3);
        for (uuid, status) in statuses {
            let expected = if uuid == "p-c" { "completed" } else { "finished" };
            assert_eq!(status, expected, "participant {uuid}");
        }
    }
}

#[tokio::test]
async fn test_end_hike_uses_path_code_when_body_has_none() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/hike/{leader_code}"),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        state.db.hike_status(join_code).await.unwrap(),
        Some(HikeStatus::Closed)
    );
}

#[tokio::test]
async fn test_end_hike_with_join_code_does_not_close() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();

    // The join code is not a leader capability: nothing matches, still 200.
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/hike/{join_code}"),
        Some(json!({ "joinCode": join_code })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        state.db.hike_status(join_code).await.unwrap(),
        Some(HikeStatus::Open)
    );
}

#[tokio::test]
async fn test_end_hike_rejects_bad_payload() {
    let (app, _) = create_test_app().await;

    let response = send(&app, Method::PUT, "/api/hike/some-code", Some(json!("end it"))).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_closed_hike_is_invisible_to_both_codes() {
    let (app, _) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    send(
        &app,
        Method::PUT,
        &format!("/api/hike/{leader_code}"),
        Some(json!({ "leaderCode": leader_code })),
    )
    .await;

    let by_join = send(&app, Method::GET, &format!("/api/hike/{join_code}"), None).await;
    assert_eq!(by_join.status, StatusCode::NOT_FOUND);

    let by_leader = send(
        &app,
        Method::GET,
        &format!("/api/hike/{join_code}?leaderCode={leader_code}"),
        None,
    )
    .await;
    assert_eq!(by_leader.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nearby_hikes_via_api() {
    let (app, _) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Near", 21.3325, -157.8005, Utc::now())).await;
    let leader_code = created["leaderCode"].as_str().unwrap();
    create_hike(&app, &test_new_hike("Far", 21.6, -158.1, Utc::now())).await;

    let response = send(
        &app,
        Method::GET,
        "/api/hike?latitude=21.3330&longitude=-157.8010",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(!response.body.contains(leader_code));

    let hikes = response.json();
    let hikes = hikes.as_array().unwrap();
    assert_eq!(hikes.len(), 1);
    assert_eq!(hikes[0]["name"], "Near");
    assert_eq!(hikes[0]["sourceType"], "location");
}

#[tokio::test]
async fn test_list_hikes_without_params_is_empty() {
    let (app, _) = create_test_app().await;
    create_hike(&app, &test_new_hike("Any", 21.3, -157.8, Utc::now())).await;

    let response = send(&app, Method::GET, "/api/hike", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_list_hikes_rejects_bad_coordinates() {
    let (app, _) = create_test_app().await;

    let response = send(&app, Method::GET, "/api/hike?latitude=north&longitude=1", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_hikes_for_user_tags_sources_without_leader_codes() {
    let (app, _) = create_test_app().await;

    // Led by leader-1, also joined by leader-1
    let both = create_hike(&app, &test_new_hike("Both", 21.3, -157.8, Utc::now())).await;
    // Led by leader-1 only
    let led = create_hike(&app, &test_new_hike("Led", 21.3, -157.8, Utc::now())).await;
    // Led by someone else, joined by leader-1
    let mut other = test_new_hike("Joined", 21.3, -157.8, Utc::now());
    other.leader = test_user("leader-2", "Makoa");
    let joined = create_hike(&app, &other).await;

    let me = test_user("leader-1", "Leilani");
    for hike in [&both, &joined] {
        let join_code = hike["joinCode"].as_str().unwrap();
        let response = send(
            &app,
            Method::POST,
            &format!("/api/hike/{join_code}/participant"),
            Some(json!({ "user": me })),
        )
        .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let response = send(&app, Method::GET, "/api/hike?userUUID=leader-1", None).await;
    assert_eq!(response.status, StatusCode::OK);
    for hike in [&both, &led, &joined] {
        assert!(!response.body.contains(hike["leaderCode"].as_str().unwrap()));
    }

    let hikes = response.json();
    let mut tagged: Vec<(String, String)> = hikes
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            (
                h["name"].as_str().unwrap().to_string(),
                h["sourceType"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    tagged.sort();
    assert_eq!(
        tagged,
        vec![
            ("Both".to_string(), "joined".to_string()),
            ("Both".to_string(), "led_by_user".to_string()),
            ("Joined".to_string(), "joined".to_string()),
            ("Led".to_string(), "led_by_user".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_last_description() {
    let (app, _) = create_test_app().await;

    let response = send(
        &app,
        Method::GET,
        "/api/hike/lastdescription?hikeName=Weekly&leaderUUID=leader-1",
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!({ "description": "" }));

    let mut first = test_new_hike("Weekly", 21.3, -157.8, Utc::now());
    first.description = Some("First *week*".to_string());
    create_hike(&app, &first).await;
    let mut second = test_new_hike("Weekly", 21.3, -157.8, Utc::now());
    second.description = Some("Second *week*".to_string());
    create_hike(&app, &second).await;

    let response = send(
        &app,
        Method::GET,
        "/api/hike/lastdescription?hikeName=Weekly&leaderUUID=leader-1",
        None,
    )
    .await;
    assert_eq!(response.json(), json!({ "description": "Second *week*" }));

    let response = send(&app, Method::GET, "/api/hike/lastdescription?hikeName=Weekly", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_end_hike_with_leader_code_query_and_no_body() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();
    let response = send(
        &app,
        Method::POST,
        &format!("/api/hike/{join_code}/participant"),
        Some(json!({ "user": test_user("p-a", "Alana") })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    // Join code in the path, leader code in the query, no body at all.
    let response = send(
        &app,
        Method::PUT,
        &format!("/api/hike/{join_code}?leaderCode={leader_code}"),
        None,
    )
    .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(
        state.db.hike_status(join_code).await.unwrap(),
        Some(HikeStatus::Closed)
    );
    assert_eq!(
        state.db.membership_status(join_code, "p-a").await.unwrap().as_deref(),
        Some("finished")
    );
}

#[tokio::test]
async fn test_end_hike_query_code_wins_over_body_and_path() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/hike/{join_code}?leaderCode={leader_code}"),
        Some(json!({ "leaderCode": "stale-code", "joinCode": join_code })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        state.db.hike_status(join_code).await.unwrap(),
        Some(HikeStatus::Closed)
    );
}

#[tokio::test]
async fn test_end_hike_with_empty_body_uses_path_code() {
    let (app, state) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Loop", 21.3, -157.8, Utc::now())).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let leader_code = created["leaderCode"].as_str().unwrap();

    let response = send(&app, Method::PUT, &format!("/api/hike/{leader_code}"), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        state.db.hike_status(join_code).await.unwrap(),
        Some(HikeStatus::Closed)
    );
}

#[tokio::test]
async fn test_sub_second_start_time_reads_back_unchanged() {
    let (app, _) = create_test_app().await;
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 4, 51, 9).unwrap()
        + Duration::milliseconds(750);

    let created = create_hike(&app, &test_new_hike("Dawn", 21.3, -157.8, start)).await;
    assert_eq!(created["startTime"], "2026-10-19T04:51:09.750Z");
    let join_code = created["joinCode"].as_str().unwrap();

    let fetched = send(&app, Method::GET, &format!("/api/hike/{join_code}"), None)
        .await
        .json();
    assert_eq!(fetched["startTime"], created["startTime"]);
}

#[tokio::test]
async fn test_create_echoes_start_time_at_stored_precision() {
    let (app, _) = create_test_app().await;
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 4, 51, 9).unwrap()
        + Duration::nanoseconds(750_999_999);

    let created = create_hike(&app, &test_new_hike("Dawn", 21.3, -157.8, start)).await;
    let join_code = created["joinCode"].as_str().unwrap();
    let fetched = send(&app, Method::GET, &format!("/api/hike/{join_code}"), None)
        .await
        .json();

    assert_eq!(created["startTime"], "2026-10-19T04:51:09.750Z");
    assert_eq!(fetched["startTime"], "2026-10-19T04:51:09.750Z");
}

#[tokio::test]
async fn test_listed_hikes_identify_their_leader() {
    let (app, _) = create_test_app().await;
    let created = create_hike(&app, &test_new_hike("Ridge", 21.3325, -157.8005, Utc::now())).await;
    assert_eq!(created["leader"]["uuid"], "leader-1");

    let response = send(
        &app,
        Method::GET,
        "/api/hike?latitude=21.3325&longitude=-157.8005",
        None,
    )
    .await;
    let hikes = response.json();
    assert_eq!(hikes[0]["leader"]["uuid"], "leader-1");
    assert_eq!(hikes[0]["leader"]["name"], "Leilani");
}
