use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{App, HttpResponse, HttpServer, Responder, delete, get, http, post, web};
use clap::Parser;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;

use lyric_quiz_core::{GameConfig, GameError, GameManager};

/// Command line flags of the quiz server
#[derive(Debug, Clone, Parser)]
#[command(name = "lyric-quiz-server")]
#[command(about = "HTTP API for the lyric fill-in-the-blank quiz")]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to listen on
	#[arg(short, long, default_value = "8000")]
	port: u16,

	/// JSON file with albums, songs and tagged lyric lines
	#[arg(long)]
	albums: Option<PathBuf>,

	/// Directory of .txt files used as extra training text
	#[arg(long)]
	corpus_dir: Option<PathBuf>,

	/// Order of the word n-gram model
	#[arg(long, default_value = "3")]
	ngram_order: usize,

	/// Log level (trace, debug, info, warn, error), RUST_LOG takes precedence
	#[arg(long, default_value = "info")]
	log_level: String,

	/// Origin allowed by CORS, repeatable ("*" allows any)
	#[arg(long = "allowed-origin", default_values = ["http://localhost:5173", "http://127.0.0.1:5173"])]
	allowed_origins: Vec<String>,
}

/// Query parameters of `question/{session_id}`
#[derive(Deserialize)]
struct QuestionQuery {
	song: Option<String>,
	/// Difficulty (easy, medium, hard) or section name
	part: Option<String>,
}

#[derive(Deserialize)]
struct AnswerBody {
	session_id: String,
	selected_answer: String,
}

fn detail(message: impl Into<String>) -> serde_json::Value {
	json!({ "detail": message.into() })
}

/// Maps a core error onto an HTTP status.
///
/// Unknown sessions and questions that could not be produced are 404, a
/// missing pending question or a bad parameter is 400.
fn error_response(e: &GameError) -> HttpResponse {
	match e {
		GameError::SessionNotFound(_) | GameError::SongNotFound(_) | GameError::UnknownPart(_) => {
			HttpResponse::NotFound().json(detail(e.to_string()))
		}
		GameError::InsufficientData(_) => {
			HttpResponse::NotFound().json(detail("Session not found or could not generate question"))
		}
		GameError::NoPendingQuestion | GameError::InvalidParameter(_) => HttpResponse::BadRequest().json(detail(e.to_string())),
	}
}

#[get("/")]
async fn get_root() -> impl Responder {
	HttpResponse::Ok().json(json!({ "message": "Lyric Quiz API" }))
}

#[get("/health")]
async fn get_health(data: web::Data<GameManager>) -> impl Responder {
	let stats = data.get_model_stats();
	HttpResponse::Ok().json(json!({
		"status": "healthy",
		"model_loaded": !data.model().is_empty(),
		"vocabulary_size": stats.vocabulary_size,
	}))
}

#[get("/stats")]
async fn get_stats(data: web::Data<GameManager>) -> impl Responder {
	HttpResponse::Ok().json(data.get_model_stats())
}

#[post("/session")]
async fn post_session(data: web::Data<GameManager>) -> impl Responder {
	let session_id = data.create_session();
	HttpResponse::Ok().json(json!({ "session_id": session_id, "message": "Session created successfully" }))
}

#[get("/question/{session_id}")]
async fn get_question(
	data: web::Data<GameManager>,
	path: web::Path<String>,
	query: web::Query<QuestionQuery>,
) -> impl Responder {
	let session_id = path.into_inner();
	match data.get_question(&session_id, query.song.as_deref(), query.part.as_deref()) {
		Ok(question) => HttpResponse::Ok().json(question),
		Err(e) => error_response(&e),
	}
}

#[get("/songs")]
async fn get_songs(data: web::Data<GameManager>) -> impl Responder {
	HttpResponse::Ok().json(json!({ "songs": data.list_songs() }))
}

#[post("/check-answer")]
async fn post_check_answer(data: web::Data<GameManager>, body: web::Json<AnswerBody>) -> impl Responder {
	match data.check_answer(&body.session_id, &body.selected_answer) {
		Ok(outcome) => HttpResponse::Ok().json(outcome),
		Err(e) => error_response(&e),
	}
}

#[get("/session/{session_id}/stats")]
async fn get_session_stats(data: web::Data<GameManager>, path: web::Path<String>) -> impl Responder {
	match data.get_session_stats(&path) {
		Ok(stats) => HttpResponse::Ok().json(stats),
		Err(e) => error_response(&e),
	}
}

#[delete("/session/{session_id}")]
async fn delete_session(data: web::Data<GameManager>, path: web::Path<String>) -> impl Responder {
	if data.delete_session(&path) {
		HttpResponse::Ok().json(json!({ "message": "Session deleted successfully" }))
	} else {
		HttpResponse::NotFound().json(detail("Session not found"))
	}
}

/// Registers every endpoint under `/v1`, and again at the root for clients
/// of the unversioned API.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(web::scope("/v1").configure(endpoints)).configure(endpoints);
}

fn endpoints(cfg: &mut web::ServiceConfig) {
	cfg.service(get_root)
		.service(get_health)
		.service(get_stats)
		.service(post_session)
		.service(get_question)
		.service(get_songs)
		.service(post_check_answer)
		.service(get_session_stats)
		.service(delete_session);
}

fn cors(origins: &[String]) -> Cors {
	let mut cors = Cors::default()
		.allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
		.allowed_headers(vec![http::header::CONTENT_TYPE, http::header::ACCEPT])
		.supports_credentials();
	for origin in origins {
		cors = if origin == "*" { cors.allow_any_origin() } else { cors.allowed_origin(origin) };
	}
	cors
}

/// Main entry point for the server.
///
/// Loads the catalog and the corpus, builds the model once, and shares the
/// game manager with every worker. The manager locks per session, so no
/// outer lock is needed.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	env_logger::Builder::new()
		.filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Info))
		.parse_default_env()
		.init();

	let config = GameConfig {
		ngram_order: args.ngram_order,
		..GameConfig::default()
	};
	let manager = match GameManager::load(args.albums.as_deref(), args.corpus_dir.as_deref(), config) {
		Ok(manager) => manager,
		Err(e) => {
			error!("Cannot start the game: {e}");
			return Err(e.into());
		}
	};
	let data = web::Data::new(manager);
	let origins = args.allowed_origins.clone();

	info!("Listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(cors(&origins))
			.app_data(data.clone())
			.configure(routes)
	})
	.bind((args.host.as_str(), args.port))?
	.run()
	.await?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::{http::StatusCode, test};
	use lyric_quiz_core::game::catalog::{LyricLine, Song, SongCatalog};
	use lyric_quiz_core::model::ngram_model::NGramModel;
	use serde_json::Value;

	const CHORUS: &str = "Romeo take me somewhere we can be alone";

	fn manager() -> web::Data<GameManager> {
		let mut catalog = SongCatalog::new();
		catalog.insert(Song::new("Love Story", "Fearless", vec![LyricLine::new(CHORUS, "Chorus", Some(1))]));
		let lines: Vec<String> = [
			CHORUS,
			"we are never ever getting back together like ever",
			"i knew you were trouble when you walked in",
		]
		.iter()
		.map(|l| l.to_string())
		.collect();
		let model = NGramModel::build(&lines, 3).unwrap();
		web::Data::new(GameManager::new(model, catalog, GameConfig::default()))
	}

	macro_rules! app {
		($data:expr) => {
			test::init_service(App::new().app_data($data.clone()).configure(routes)).await
		};
	}

	#[actix_web::test]
	async fn test_health_and_stats() {
		let data = manager();
		let app = app!(data);

		let req = test::TestRequest::get().uri("/v1/health").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["status"], "healthy");
		assert_eq!(body["model_loaded"], true);

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert!(body["vocabulary_size"].as_u64().unwrap() > 0);
		assert!(body["context_count"].as_u64().unwrap() > 0);
	}

	#[actix_web::test]
	async fn test_question_answer_round() {
		let data = manager();
		let app = app!(data);

		let req = test::TestRequest::post().uri("/v1/session").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		let session_id = body["session_id"].as_str().unwrap().to_owned();

		let req = test::TestRequest::get()
			.uri(&format!("/v1/question/{session_id}?song=love%20story&part=easy"))
			.to_request();
		let question: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(question["options"].as_array().unwrap().len(), 5);
		let answer = question["correct_answer"].as_str().unwrap().to_owned();
		assert!(CHORUS.split(' ').any(|w| w == answer));

		let req = test::TestRequest::post()
			.uri("/v1/check-answer")
			.set_json(json!({ "session_id": session_id, "selected_answer": answer.to_uppercase() }))
			.to_request();
		let outcome: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(outcome["correct"], true);
		assert_eq!(outcome["score"], 100);

		// Nothing pending any more
		let req = test::TestRequest::post()
			.uri("/v1/check-answer")
			.set_json(json!({ "session_id": session_id, "selected_answer": answer }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get()
			.uri(&format!("/v1/session/{session_id}/stats"))
			.to_request();
		let stats: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats["questions_answered"], 1);
		assert_eq!(stats["accuracy_percent"], 100.0);
	}

	#[actix_web::test]
	async fn test_unknown_session_is_404() {
		let data = manager();
		let app = app!(data);

		let req = test::TestRequest::get().uri("/v1/question/missing").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::post()
			.uri("/v1/check-answer")
			.set_json(json!({ "session_id": "missing", "selected_answer": "x" }))
			.to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get().uri("/v1/session/missing/stats").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::delete().uri("/v1/session/missing").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
	}

	#[actix_web::test]
	async fn test_unversioned_paths_reach_the_same_handlers() {
		let data = manager();
		let app = app!(data);

		let req = test::TestRequest::get().uri("/").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["message"], "Lyric Quiz API");

		let req = test::TestRequest::post().uri("/session").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		let session_id = body["session_id"].as_str().unwrap().to_owned();

		let req = test::TestRequest::get().uri(&format!("/question/{session_id}")).to_request();
		let question: Value = test::call_and_read_body_json(&app, req).await;
		let answer = question["correct_answer"].as_str().unwrap().to_owned();

		// A question fetched at the root is pending for the versioned route too
		let req = test::TestRequest::post()
			.uri("/v1/check-answer")
			.set_json(json!({ "session_id": session_id, "selected_answer": answer }))
			.to_request();
		let outcome: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(outcome["correct"], true);

		let req = test::TestRequest::get().uri(&format!("/session/{session_id}/stats")).to_request();
		let stats: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats["questions_answered"], 1);

		let req = test::TestRequest::get().uri("/v1/").to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
	}

	#[actix_web::test]
	async fn test_delete_then_lookup() {
		let data = manager();
		let app = app!(data);
		let session_id = data.create_session();

		let req = test::TestRequest::delete().uri(&format!("/v1/session/{session_id}")).to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
		assert_eq!(data.session_count(), 0);
	}

	#[actix_web::test]
	async fn test_songs_listing() {
		let data = manager();
		let app = app!(data);

		let req = test::TestRequest::get().uri("/v1/songs").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["songs"][0]["title"], "Love Story");
		assert_eq!(body["songs"][0]["parts"][0], "Chorus");
	}

	#[actix_web::test]
	async fn test_empty_model_cannot_produce_questions() {
		let data = web::Data::new(GameManager::new(
			NGramModel::empty(3).unwrap(),
			SongCatalog::new(),
			GameConfig::default(),
		));
		let app = app!(data);
		let session_id = data.create_session();

		let req = test::TestRequest::get().uri(&format!("/v1/question/{session_id}")).to_request();
		assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

		let req = test::TestRequest::get().uri("/v1/health").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["model_loaded"], false);
	}
}
