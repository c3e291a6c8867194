use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::warn;

use lyric_quiz_core::game::question::Question;
use lyric_quiz_core::{GameConfig, GameManager};

/// Command line flags of the terminal game
#[derive(Debug, Parser)]
#[command(name = "lyric-quiz-play")]
#[command(about = "Guess the missing word of song lyrics in the terminal")]
struct Args {
	/// JSON file with albums, songs and tagged lyric lines
	#[arg(long)]
	albums: Option<PathBuf>,

	/// Directory of .txt files used as extra training text
	#[arg(long)]
	corpus_dir: Option<PathBuf>,

	/// Play the real lines of this song (needs --part)
	#[arg(long)]
	song: Option<String>,

	/// Difficulty (easy, medium, hard) or section name
	#[arg(long)]
	part: Option<String>,

	/// Log level (trace, debug, info, warn, error), RUST_LOG takes precedence
	#[arg(long, default_value = "warn")]
	log_level: String,
}

/// What the player typed at the option prompt.
enum Choice {
	Option(usize),
	Quit,
}

/// Reads one trimmed line, `None` at end of input.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
	let mut line = String::new();
	if input.read_line(&mut line)? == 0 {
		return Ok(None);
	}
	Ok(Some(line.trim().to_owned()))
}

fn ask_choice(input: &mut impl BufRead, option_count: usize) -> io::Result<Choice> {
	loop {
		print!("Your answer (1-{option_count}, q to quit): ");
		io::stdout().flush()?;

		let Some(line) = read_line(input)? else {
			return Ok(Choice::Quit);
		};
		if line.eq_ignore_ascii_case("q") {
			return Ok(Choice::Quit);
		}
		match line.parse::<usize>() {
			Ok(n) if (1..=option_count).contains(&n) => return Ok(Choice::Option(n - 1)),
			_ => println!("Please enter a number between 1 and {option_count}."),
		}
	}
}

fn ask_continue(input: &mut impl BufRead) -> io::Result<bool> {
	print!("Another one? [Y/n] ");
	io::stdout().flush()?;
	Ok(match read_line(input)? {
		Some(line) => !line.to_lowercase().starts_with('n'),
		None => false,
	})
}

fn show(question: &Question) {
	println!();
	println!("  {}", question.incomplete_lyric);
	println!();
	for (i, option) in question.options.iter().enumerate() {
		println!("  {}. {}", i + 1, option);
	}
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	env_logger::Builder::new()
		.filter_level(args.log_level.parse().unwrap_or(log::LevelFilter::Warn))
		.parse_default_env()
		.init();

	if args.song.is_some() != args.part.is_some() {
		warn!("--song and --part go together, playing generated lines");
	}

	let manager = GameManager::load(args.albums.as_deref(), args.corpus_dir.as_deref(), GameConfig::default())
		.context("Failed to set up the game")?;
	let session_id = manager.create_session();

	println!("Lyric Quiz: fill in the missing word!");
	let stdin = io::stdin();
	let mut input = stdin.lock();

	loop {
		let question = match manager.get_question(&session_id, args.song.as_deref(), args.part.as_deref()) {
			Ok(question) => question,
			Err(e) => {
				println!("Could not build a question: {e}");
				break;
			}
		};
		show(&question);

		let index = match ask_choice(&mut input, question.options.len())? {
			Choice::Option(index) => index,
			Choice::Quit => break,
		};

		let outcome = manager.check_answer(&session_id, &question.options[index])?;
		println!("{}", outcome.feedback);
		println!("Score: {} ({} answered)", outcome.score, outcome.questions_answered);

		if !ask_continue(&mut input)? {
			break;
		}
	}

	let stats = manager.get_session_stats(&session_id)?;
	println!();
	println!("Final score: {}", stats.score);
	println!(
		"Answered {} questions, {} correct ({:.1}% accuracy)",
		stats.questions_answered, stats.correct_answers, stats.accuracy_percent
	);
	manager.delete_session(&session_id);

	Ok(())
}
