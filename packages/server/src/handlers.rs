//! HTTP handler functions for the crime REST API.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, web};
use stpaul_crime_database::queries;
use stpaul_crime_database_models::{BoundingBox, NewIncident};
use stpaul_crime_server_models::{
    ApiCodes, ApiCrimes, ApiHealth, ApiIncidents, ApiNeighborhoods, RemoveIncidentRequest,
    VisibleCrimesParams,
};

use crate::AppState;
use crate::error::ApiError;

fn text(body: &'static str) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body(body)
}

/// `GET /health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /codes`
pub async fn codes(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let codes = queries::list_codes(&state.store).await?;

    Ok(HttpResponse::Ok().json(ApiCodes { codes }))
}

/// `GET /neighborhoods`
pub async fn neighborhoods(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let neighborhoods = queries::list_neighborhoods(&state.store).await?;

    Ok(HttpResponse::Ok().json(ApiNeighborhoods { neighborhoods }))
}

/// `GET /incidents`
pub async fn incidents(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let incidents = queries::list_incidents(&state.store).await?;

    Ok(HttpResponse::Ok().json(ApiIncidents { incidents }))
}

/// `PUT /new-incident`
pub async fn new_incident(
    state: web::Data<AppState>,
    body: web::Json<NewIncident>,
) -> Result<HttpResponse, ApiError> {
    queries::insert_incident(&state.store, &body).await?;
    log::info!("Created incident {}", body.case_number);

    Ok(text("OK"))
}

/// `DELETE /remove-incident`
pub async fn remove_incident(
    state: web::Data<AppState>,
    body: web::Json<RemoveIncidentRequest>,
) -> Result<HttpResponse, ApiError> {
    queries::delete_incident(&state.store, &body.case_number).await?;

    Ok(text("OK"))
}

/// `GET /visible-crimes?bounds=south,west,north,east`
///
/// Returns up to 1000 incidents inside the bounds, newest first.
pub async fn visible_crimes(
    state: web::Data<AppState>,
    params: web::Query<VisibleCrimesParams>,
) -> Result<HttpResponse, ApiError> {
    let bbox: BoundingBox = params.bounds.parse()?;
    let crimes = queries::visible_crimes(&state.store, &bbox).await?;

    Ok(HttpResponse::Ok().json(ApiCrimes { crimes }))
}

/// `GET /populate-crimes`
///
/// Loads up to 1000 records from the upstream feed. A failure part-way
/// through leaves the earlier records in place.
pub async fn populate_crimes(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let inserted = stpaul_crime_ingest::populate(&state.store, &state.http, &state.feed_url).await?;
    log::info!("Populated {inserted} crime(s) from {}", state.feed_url);

    Ok(text("Crimes populated successfully"))
}

#[cfg(test)]
mod tests {
    use actix_web::dev::ServiceResponse;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use stpaul_crime_database::Store;
    use stpaul_crime_database::fixtures::{self, ScratchStore, scratch_store};
    use stpaul_crime_database_models::{Incident, MAX_ROWS};
    use stpaul_crime_ingest::fixtures::serve_once;

    use super::*;
    use crate::configure;
    use crate::error::INTERNAL_ERROR_BODY;

    macro_rules! app_with {
        ($store:expr, $feed_url:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState::new($store, $feed_url)))
                    .configure(configure),
            )
            .await
        };
    }

    fn incident_body(case_number: &str) -> Value {
        json!({
            "case_number": case_number,
            "date_time": "2023-10-01T14:22:00",
            "code": 500,
            "incident": "Burglary",
            "police_grid": 104,
            "neighborhood_number": 17,
            "block": "14X 6 ST E"
        })
    }

    async fn assert_internal_error(resp: ServiceResponse) {
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = test::read_body(resp).await;
        assert_eq!(body, INTERNAL_ERROR_BODY.as_bytes());
    }

    async fn assert_ok_text(resp: ServiceResponse, expected: &str) {
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = test::read_body(resp).await;
        assert_eq!(body, expected.as_bytes());
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = app_with!(Store::disconnected(), "");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request())
            .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiHealth = test::read_body_json(resp).await;
        assert!(body.healthy);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn lists_codes_and_neighborhoods() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/codes").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiCodes = test::read_body_json(resp).await;
        assert_eq!(body.codes.len(), fixtures::CODES.len());

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/neighborhoods").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["neighborhoods"].as_array().unwrap().len(),
            fixtures::NEIGHBORHOODS.len()
        );
    }

    #[actix_web::test]
    async fn created_incident_is_listed_field_for_field() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(incident_body("23000100"))
                .to_request(),
        )
        .await;
        assert_ok_text(resp, "OK").await;

        let resp =
            test::call_service(&app, test::TestRequest::get().uri("/incidents").to_request())
                .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiIncidents = test::read_body_json(resp).await;
        assert_eq!(
            body.incidents,
            vec![Incident {
                case_number: "23000100".to_string(),
                date_time: "2023-10-01T14:22:00".to_string(),
                code: 500,
                incident: "Burglary".to_string(),
                police_grid: 104,
                neighborhood_number: 17,
                block: "14X 6 ST E".to_string(),
                latitude: None,
                longitude: None,
            }]
        );
    }

    #[actix_web::test]
    async fn numbers_sent_as_strings_are_stored_as_integers() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");
        let mut body = incident_body("23000100");
        body["code"] = json!("500");
        body["police_grid"] = json!("104");
        body["neighborhood_number"] = json!("17");

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(body)
                .to_request(),
        )
        .await;
        assert_ok_text(resp, "OK").await;

        let body: Value = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/incidents").to_request(),
        )
        .await;
        let incident = &body["incidents"][0];
        assert_eq!(incident["code"], json!(500));
        assert_eq!(incident["police_grid"], json!(104));
        assert_eq!(incident["neighborhood_number"], json!(17));
    }

    #[actix_web::test]
    async fn duplicate_case_number_returns_500() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");
        let put = || {
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(incident_body("23000100"))
                .to_request()
        };

        assert_ok_text(test::call_service(&app, put()).await, "OK").await;
        assert_internal_error(test::call_service(&app, put()).await).await;
    }

    #[actix_web::test]
    async fn incomplete_incident_body_returns_500() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");

        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(json!({"case_number": "23000100"}))
                .to_request(),
        )
        .await;

        assert_internal_error(resp).await;
    }

    #[actix_web::test]
    async fn removing_unknown_incident_is_ok_and_changes_nothing() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");
        test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(incident_body("23000100"))
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/remove-incident")
                .set_json(json!({"case_number": "99999999"}))
                .to_request(),
        )
        .await;
        assert_ok_text(resp, "OK").await;

        let body: ApiIncidents = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/incidents").to_request(),
        )
        .await;
        assert_eq!(body.incidents.len(), 1);
    }

    #[actix_web::test]
    async fn removes_incident() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");
        test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/new-incident")
                .set_json(incident_body("23000100"))
                .to_request(),
        )
        .await;

        let resp = test::call_service(
            &app,
            test::TestRequest::delete()
                .uri("/remove-incident")
                .set_json(json!({"case_number": "23000100"}))
                .to_request(),
        )
        .await;
        assert_ok_text(resp, "OK").await;

        let body: ApiIncidents = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/incidents").to_request(),
        )
        .await;
        assert!(body.incidents.is_empty());
    }

    #[actix_web::test]
    async fn visible_crimes_returns_incidents_in_bounds_newest_first() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        fixtures::insert_located_incident(&store, "A", "2023-01-01T08:00:00", 44.95, -93.05)
            .await
            .unwrap();
        fixtures::insert_located_incident(&store, "B", "2023-02-01T08:00:00", 44.91, -93.09)
            .await
            .unwrap();
        fixtures::insert_located_incident(&store, "OUT", "2023-03-01T08:00:00", 44.95, -93.20)
            .await
            .unwrap();
        let app = app_with!(store, "");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/visible-crimes?bounds=44.9,-93.1,45.0,-93.0")
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body,
            json!({
                "crimes": [
                    {
                        "case_number": "B",
                        "date_time": "2023-02-01T08:00:00",
                        "incident_type": "Theft",
                        "incident": "Theft",
                        "neighborhood_name": "Thomas/Dale(Frogtown)",
                        "block": "98X UNIVERSITY AV W"
                    },
                    {
                        "case_number": "A",
                        "date_time": "2023-01-01T08:00:00",
                        "incident_type": "Theft",
                        "incident": "Theft",
                        "neighborhood_name": "Thomas/Dale(Frogtown)",
                        "block": "98X UNIVERSITY AV W"
                    }
                ]
            })
        );
    }

    #[actix_web::test]
    async fn visible_crimes_ignores_extra_bounds_values() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        fixtures::insert_located_incident(&store, "A", "2023-01-01T08:00:00", 44.95, -93.05)
            .await
            .unwrap();
        let app = app_with!(store, "");

        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/visible-crimes?bounds=44.9,-93.1,45.0,-93.0,7")
                .to_request(),
        )
        .await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: ApiCrimes = test::read_body_json(resp).await;
        assert_eq!(body.crimes.len(), 1);
        assert_eq!(body.crimes[0].case_number, "A");
    }

    #[actix_web::test]
    async fn malformed_or_missing_bounds_return_500() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let app = app_with!(store, "");

        for uri in [
            "/visible-crimes?bounds=bad",
            "/visible-crimes?bounds=44.9,-93.1,45.0",
            "/visible-crimes",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
            assert_internal_error(resp).await;
        }
    }

    #[actix_web::test]
    async fn disconnected_store_returns_500() {
        let app = app_with!(Store::disconnected(), "");

        for uri in ["/codes", "/neighborhoods", "/incidents"] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request())
                .await;
            assert_internal_error(resp).await;
        }
    }

    #[actix_web::test]
    async fn populate_inserts_first_thousand_feed_records() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let feed: Vec<Value> = (0..MAX_ROWS + 50)
            .map(|i| incident_body(&format!("{i:08}")))
            .collect();
        let url = serve_once(200, Value::Array(feed).to_string()).await;
        let app = app_with!(store, &url);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/populate-crimes").to_request(),
        )
        .await;
        assert_ok_text(resp, "Crimes populated successfully").await;

        let body: ApiIncidents = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/incidents").to_request(),
        )
        .await;
        assert_eq!(body.incidents.len(), MAX_ROWS);
    }

    #[actix_web::test]
    async fn populate_failure_keeps_earlier_records_and_returns_500() {
        let ScratchStore { dir: _dir, store, .. } = scratch_store().await.unwrap();
        let feed = json!([
            incident_body("00000000"),
            incident_body("00000001"),
            incident_body("00000000"),
            incident_body("00000003"),
        ]);
        let url = serve_once(200, feed.to_string()).await;
        let app = app_with!(store, &url);

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/populate-crimes").to_request(),
        )
        .await;
        assert_internal_error(resp).await;

        let body: ApiIncidents = test::call_and_read_body_json(
            &app,
            test::TestRequest::get().uri("/incidents").to_request(),
        )
        .await;
        let mut case_numbers: Vec<String> =
            body.incidents.into_iter().map(|i| i.case_number).collect();
        case_numbers.sort();
        assert_eq!(case_numbers, ["00000000", "00000001"]);
    }
}
