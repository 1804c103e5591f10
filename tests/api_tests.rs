mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};

use common::{build_test_app, delete, get, post, put, send, today, ADMIN_PASSWORD};

fn new_vehicle(plate: &str, chassis: &str) -> Value {
    let far = today() + Duration::days(300);
    json!({
        "immatriculation": plate,
        "marque": "Toyota",
        "modele": "Hilux",
        "couleur": "Gris",
        "numero_chassis": chassis,
        "date_expiration_assurance": far,
        "date_expiration_controle_technique": far,
        "date_expiration_vignette": far,
        "date_expiration_stationnement": far,
        "kilometrage_actuel": 12000,
        "kilometrage_dernier_entretien": 10000
    })
}

async fn login_token(app: &axum::Router) -> String {
    let (status, body) = post(
        app,
        "/auth/login",
        json!({ "username": "admin", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

// --- Sistema ---

#[tokio::test]
async fn test_root_banner() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "IPSCO Fleet API");
    assert_eq!(body["storage"], "memoire (demo)");
    assert!(body["features"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn test_health_check() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_global_stats() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_vehicules"], 3);
    assert_eq!(body["total_chauffeurs"], 3);
    assert_eq!(body["missions_actives"], 1);
    assert_eq!(body["system_status"], "operational");
}

// --- Véhicules ---

#[tokio::test]
async fn test_vehicle_crud_lifecycle() {
    let app = build_test_app().await;

    let payload = new_vehicle("xyz-999", "CHASSIS99999");
    let (status, created) = post(&app, "/api/vehicules", payload).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["immatriculation"], "XYZ-999");
    let id = created["id"].as_i64().unwrap();
    assert_eq!(id, 4);

    let (status, fetched) = get(&app, &format!("/api/vehicules/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["modele"], "Hilux");

    let (status, updated) = put(
        &app,
        &format!("/api/vehicules/{}", id),
        json!({ "couleur": "Noir", "kilometrage_actuel": 15000 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["couleur"], "Noir");
    assert_eq!(updated["kilometrage_actuel"], 15000);
    assert_eq!(updated["marque"], "Toyota");
    assert!(updated["date_modification"].is_string());

    let (status, body) = delete(&app, &format!("/api/vehicules/{}", id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = get(&app, &format!("/api/vehicules/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_vehicle_duplicate_plate_conflict() {
    let app = build_test_app().await;

    let payload = new_vehicle("ABC-123", "OTHERCHASSIS1");
    let (status, body) = post(&app, "/api/vehicules", payload).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "Véhicule avec immatriculation 'ABC-123' existe déjà");

    let (_, list) = get(&app, "/api/vehicules").await;
    assert_eq!(list["total"], 3);
}

#[tokio::test]
async fn test_vehicle_invalid_payload_rejected() {
    let app = build_test_app().await;

    let mut payload = new_vehicle("AB", "CHASSIS00001");
    payload["kilometrage_actuel"] = json!(-5);

    let (status, body) = post(&app, "/api/vehicules", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_vehicle_referenced_by_mission_cannot_be_deleted() {
    let app = build_test_app().await;

    let (status, _) = delete(&app, "/api/vehicules/1").await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = get(&app, "/api/vehicules/1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_vehicle_list_paging_and_search() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/vehicules?skip=1&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["vehicules"].as_array().unwrap().len(), 1);
    assert_eq!(body["vehicules"][0]["immatriculation"], "DEF-456");

    let (_, body) = get(&app, "/api/vehicules?search=honda").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["vehicules"][0]["nom_complet"], "DEF-456 - Honda Civic");

    let (status, _) = get(&app, "/api/vehicules?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_vehicle_stats_alerts() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/vehicules/1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statut"], "attention");
    assert_eq!(body["jours_avant_expiration"]["assurance"], 15);
    assert_eq!(body["kilometrage_depuis_entretien"], 5000);
    assert_eq!(body["alertes"][0], "Assurance expire dans 15 jours");

    let (_, body) = get(&app, "/api/vehicules/3/stats").await;
    assert_eq!(body["statut"], "alerte");
    assert_eq!(body["alertes"][0], "Contrôle technique EXPIRÉ depuis 5 jours");

    let (_, body) = get(&app, "/api/vehicules/2/stats").await;
    assert_eq!(body["statut"], "actif");
    assert!(body["alertes"].as_array().unwrap().is_empty());

    let (status, _) = get(&app, "/api/vehicules/99/stats").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_vehicle_stats_with_reference_date() {
    let app = build_test_app().await;

    let date = today() + Duration::days(15);
    let (status, body) = get(&app, &format!("/api/vehicules/1/stats?date={}", date)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["statut"], "alerte");
    assert_eq!(body["alertes"][0], "Assurance expire aujourd'hui");
}

#[tokio::test]
async fn test_fleet_summary() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/vehicules/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_vehicules"], 3);
    assert_eq!(body["vehicules_actifs"], 1);
    assert_eq!(body["vehicules_attention"], 1);
    assert_eq!(body["vehicules_alerte"], 1);
}

// --- Chauffeurs ---

#[tokio::test]
async fn test_driver_directory() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/chauffeurs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["chauffeurs"][0]["id"], 1);

    let (status, body) = get(&app, "/api/chauffeurs/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_driver_detail_and_missions() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/chauffeurs/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nom_complet"], "Marie Kasongo");
    assert_eq!(body["missions_total"], 1);
    assert_eq!(body["vehicule_attribue"]["immatriculation"], "DEF-456");

    let (status, body) = get(&app, "/api/chauffeurs/2/missions").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["chauffeur_id"], 2);
    assert_eq!(body["total_missions"], 1);
    assert_eq!(body["total_km"], 45);
    assert_eq!(body["missions"][0]["statut"], "terminee");

    let (status, _) = get(&app, "/api/chauffeurs/9/missions").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Missions ---

#[tokio::test]
async fn test_create_mission_without_assignment() {
    let app = build_test_app().await;

    let (status, body) = post(
        &app,
        "/api/missions",
        json!({
            "destination": "Kolwezi",
            "date_souhaitee": today() + Duration::days(3),
            "heure_depart": "07:00"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Mission créée avec succès");
    assert_eq!(body["mission"]["id"], 5);
    assert_eq!(body["mission"]["statut"], "en_attente");
    assert_eq!(body["mission"]["distance_parcourue"], 0);
    assert_eq!(body["next_steps"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_create_mission_with_assignment_skips_steps() {
    let app = build_test_app().await;

    let (status, body) = post(
        &app,
        "/api/missions",
        json!({
            "destination": "Likasi",
            "date_souhaitee": today(),
            "vehicule_id": 2,
            "chauffeur_id": 1
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["next_steps"], json!(["Validation par le dispatcher"]));
}

#[tokio::test]
async fn test_create_mission_rejects_bad_input() {
    let app = build_test_app().await;

    let (status, _) = post(
        &app,
        "/api/missions",
        json!({ "destination": "   ", "date_souhaitee": today() }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "/api/missions",
        json!({ "destination": "Kipushi", "date_souhaitee": today(), "heure_depart": "25:99" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &app,
        "/api/missions",
        json!({ "destination": "Kipushi", "date_souhaitee": today(), "vehicule_id": 77 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, list) = get(&app, "/api/missions").await;
    assert_eq!(list["total"], 4);
}

#[tokio::test]
async fn test_mission_detail_has_timeline() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/missions/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 1);
    assert_eq!(body["statut"], "en_cours");
    assert!(!body["timeline"].as_array().unwrap().is_empty());

    let (status, _) = get(&app, "/api/missions/404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mission_list_filters() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/missions?statut=en_cours").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["filters_applied"]["statut"], "en_cours");

    let (_, body) = get(&app, "/api/missions?statut=COMPLETED").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["missions"][0]["statut"], "terminee");

    let (status, body) = get(&app, "/api/missions?statut=inconnu").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    let tomorrow = today() + Duration::days(1);
    let (_, body) = get(&app, &format!("/api/missions?date_debut={}", tomorrow)).await;
    assert_eq!(body["total"], 2);

    let (_, body) = get(&app, "/api/missions?chauffeur_id=3").await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["missions"][0]["id"], 3);
}

#[tokio::test]
async fn test_update_mission_invalid_statut_leaves_record_untouched() {
    let app = build_test_app().await;

    let (status, body) = put(
        &app,
        "/api/missions/3",
        json!({ "statut": "envolee", "destination": "Ailleurs" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, mission) = get(&app, "/api/missions/3").await;
    assert_eq!(mission["statut"], "planifiee");
    assert_eq!(mission["destination"], "Université de Lubumbashi");
}

#[tokio::test]
async fn test_update_mission_partial_and_clear_reference() {
    let app = build_test_app().await;

    let (status, body) = put(
        &app,
        "/api/missions/3",
        json!({ "vehicule_id": null, "distance_parcourue": 12, "statut": "en_cours" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mission"]["vehicule_id"], Value::Null);
    assert_eq!(body["mission"]["chauffeur_id"], 3);
    assert_eq!(body["mission"]["distance_parcourue"], 12);
    assert_eq!(body["mission"]["statut"], "en_cours");

    let (status, _) = put(&app, "/api/missions/3", json!({ "chauffeur_id": 99 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = put(&app, "/api/missions/99", json!({ "destination": "Nulle part" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_change_status_via_query() {
    let app = build_test_app().await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/missions/4/statut?nouveau_statut=planifiee",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mission_id"], 4);
    assert_eq!(body["ancien_statut"], "en_attente");
    assert_eq!(body["nouveau_statut"], "planifiee");
    assert_eq!(body["message"], "Statut changé de 'en_attente' vers 'planifiee'");
}

#[tokio::test]
async fn test_change_status_via_body() {
    let app = build_test_app().await;

    let (status, body) = put(
        &app,
        "/api/missions/1/statut",
        json!({ "nouveau_statut": "Terminee" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nouveau_statut"], "terminee");

    let (_, dashboard) = get(&app, "/api/missions/stats/dashboard").await;
    assert_eq!(dashboard["stats_by_status"]["terminee"], 2);
}

#[tokio::test]
async fn test_change_status_rejects_unknown_and_missing() {
    let app = build_test_app().await;

    let (status, _) = put(
        &app,
        "/api/missions/1/statut",
        json!({ "nouveau_statut": "perdue" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::PUT, "/api/missions/1/statut", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/missions/99/statut?nouveau_statut=annulee",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, mission) = get(&app, "/api/missions/1").await;
    assert_eq!(mission["statut"], "en_cours");
}

#[tokio::test]
async fn test_delete_mission() {
    let app = build_test_app().await;

    let (status, body) = delete(&app, "/api/missions/2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Mission 2 supprimée avec succès");
    assert_eq!(body["mission_supprimee"]["statut"], "terminee");

    let (status, _) = delete(&app, "/api/missions/2").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, "/api/vehicules/2").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Los ids nunca se reutilizan
    let (_, created) = post(
        &app,
        "/api/missions",
        json!({ "destination": "Kasumbalesa", "date_souhaitee": today() }),
    )
    .await;
    assert_eq!(created["mission"]["id"], 5);
}

#[tokio::test]
async fn test_mission_dashboard() {
    let app = build_test_app().await;

    let (status, body) = get(&app, "/api/missions/stats/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_missions"], 4);
    assert_eq!(body["missions_aujourd_hui"], 2);
    assert_eq!(body["distance_totale_km"], 70);
    assert_eq!(body["missions_actives"], 1);
    assert_eq!(body["missions_en_attente"], 1);
    assert_eq!(body["taux_completion"], 25.0);

    let tomorrow = today() + Duration::days(1);
    let (_, body) = get(&app, &format!("/api/missions/stats/dashboard?date={}", tomorrow)).await;
    assert_eq!(body["missions_aujourd_hui"], 2);
}

// --- Auth ---

#[tokio::test]
async fn test_login_and_current_user() {
    let app = build_test_app().await;
    let token = login_token(&app).await;

    let (status, body) = send(&app, Method::GET, "/auth/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "admin");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["permissions"], json!(["read", "write", "delete"]));
}

#[tokio::test]
async fn test_login_with_bad_credentials() {
    let app = build_test_app().await;

    let (status, body) = post(
        &app,
        "/auth/login",
        json!({ "username": "admin", "password": "mauvais" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Nom d'utilisateur ou mot de passe incorrect");

    let (status, _) = post(
        &app,
        "/auth/login",
        json!({ "username": "inconnu", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = build_test_app().await;

    let (status, _) = get(&app, "/auth/me").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/auth/me", None, Some("pas-un-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = build_test_app().await;
    let token = login_token(&app).await;

    let (status, body) = send(&app, Method::POST, "/auth/logout", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Déconnexion réussie");

    let (status, _) = send(&app, Method::GET, "/auth/me", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Sin token el logout también responde OK
    let (status, _) = send(&app, Method::POST, "/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
