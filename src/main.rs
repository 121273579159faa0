#[macro_use] extern crate rocket;


mod config;
mod cors;
mod error;
mod logger;
mod page_route;
mod photo;
mod report_route;
mod report_sys;
mod store;
mod util;


use std::{env, io, process};
use std::fs::create_dir_all;
use rocket::{
    Build, Rocket,
    data::{Limits, ToByteUnit},
    fs::FileServer,
    request::Request,
    serde::json::Json,
};
use serde_json::{json, Value as JsonValue};
use log::{error, info};

use config::{ServerConfig, StoreKind};
use report_sys::ReportSys;
use store::{DocumentStore, FirestoreStore, MemoryStore, StoreError};


const STATIC_ROUTE: &'static str = "static";


#[catch(400)]
fn bad_request(_req: &Request) -> Json<JsonValue> {
    Json(json!({ "detail": "Malformed request" }))
}

#[catch(404)]
fn not_found(req: &Request) -> Json<JsonValue> {
    Json(json!({ "detail": format!("Not found: {}", req.uri()) }))
}

#[catch(422)]
fn unprocessable(_req: &Request) -> Json<JsonValue> {
    Json(json!({ "detail": "Invalid report payload" }))
}

#[catch(413)]
fn payload_too_large(_req: &Request) -> Json<JsonValue> {
    Json(json!({ "detail": "Request body too large" }))
}

#[catch(500)]
fn internal_error(_req: &Request) -> Json<JsonValue> {
    Json(json!({ "detail": "Internal server error" }))
}


fn open_store(config: &ServerConfig) -> Result<Box<dyn DocumentStore>, StoreError> {
    match config.store {
        StoreKind::Firestore => {
            let store = FirestoreStore::from_credentials_file(&config.credentials_path)?;
            Ok(Box::new(store))
        },
        StoreKind::Memory => {
            info!("Using in-memory report store");
            Ok(Box::new(MemoryStore::new()))
        },
    }
}

fn prepare_dirs(config: &ServerConfig) -> io::Result<()> {
    create_dir_all(&config.images_dir)
        .and(create_dir_all(&config.static_dir))
}

pub fn build_rocket(config: ServerConfig, store: Box<dyn DocumentStore>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.host.clone()))
        .merge(("port", config.port))
        .merge(("limits", Limits::default()
            .limit("json", (report_route::FILE_UPLOAD_LIMIT as u64).bytes())));

    let images = FileServer::from(&config.images_dir);
    let statics = FileServer::from(&config.static_dir);
    let sys = ReportSys::new(store, config.images_dir.clone());

    rocket::custom(figment)
        .attach(cors::Cors)
        .manage(sys)
        .manage(config)
        .mount("/", routes![
            page_route::index,
            page_route::map_page,
            cors::preflight,
        ])
        .mount("/", routes![
            report_route::post_report,
            report_route::get_reports,
            report_route::get_stats,
        ])
        .mount(format!("/{}", photo::IMAGE_PUBLIC_DIR), images)
        .mount(format!("/{}", STATIC_ROUTE), statics)
        .register("/", catchers![
            bad_request,
            not_found,
            unprocessable,
            payload_too_large,
            internal_error,
        ])
}


#[rocket::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {}", err);
            process::exit(1);
        },
    };

    let _sentry = match logger::init_logger(config.log_level, config.sentry_dsn.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Logger initialization failed: {}", err);
            process::exit(1);
        },
    };

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(err) => {
            error!("Can't open the report store: {}", err);
            process::exit(1);
        },
    };

    if env::args().nth(1).as_deref() == Some("check-store") {
        match store::check_connection(store.as_ref()).await {
            Ok(id) => {
                info!("Store connection ok, wrote test/{}", id);
                return;
            },
            Err(err) => {
                error!("Store connection failed: {}", err);
                process::exit(1);
            },
        }
    }

    if let Err(err) = prepare_dirs(&config) {
        error!("Initial directory creation failed: {}", err);
        process::exit(1);
    }

    info!("Listening on {}:{}", config.host, config.port);

    if let Err(err) = build_rocket(config, store).launch().await {
        error!("Server stopped: {}", err);
        process::exit(1);
    }
}
