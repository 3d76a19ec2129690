// Command-line front end for the learning board
//
// Type a move as `e2e4`, or one of the commands listed by `help`. Set `RUST_LOG=zoochess=debug`
// to see what the state engine does.

use zoochess::base::{Position, PrettyStyle, Square};
use zoochess::{Config, Controller, Event, Frame, Ledger, MoveProposal};

use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

const HELP: &str = "\
commands:
  e2e4         make a move (e7e8n to promote to a knight)
  moves <sq>   show where the piece on <sq> can go
  undo         take back the last move
  reset        start over
  tutorial [p|r|n|b|q|k]
               practice a single piece
  game         back to the full game
  link         print a link to the current game
  json         print the current frame as JSON
  quit";

fn show(frame: &Frame) {
    match Position::from_fen(&frame.fen) {
        Ok(pos) => println!("{}", pos.pretty(PrettyStyle::Utf8)),
        Err(e) => println!("cannot show position: {}", e),
    }
    if let Some(tutorial) = frame.tutorial {
        println!("Tutorial: {}", tutorial.title);
        println!("{}", tutorial.description);
    }
    println!("Moves: {}", Ledger(&frame.history));
    println!("{}", frame.message);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let query = std::env::args().nth(1).unwrap_or_default();
    let mut controller = match Controller::from_query(Config::default(), &query) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("cannot start: {}", e);
            return;
        }
    };
    show(&controller.frame());

    let mut stdin = io::stdin().lock();
    loop {
        print!("> ");
        io::stdout().flush().unwrap();
        let mut s = String::new();
        if stdin.read_line(&mut s).unwrap() == 0 {
            break;
        }
        let mut words = s.split_ascii_whitespace();
        let event = match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("quit"), _) => break,
            (Some("help"), _) => {
                println!("{}", HELP);
                continue;
            }
            (Some("link"), _) => {
                println!("{}", controller.share_link("https://zoochess.example/"));
                continue;
            }
            (Some("json"), _) => {
                println!("{}", controller.frame().to_json().unwrap());
                continue;
            }
            (Some("moves"), Some(sq)) => match sq.parse::<Square>() {
                Ok(sq) => {
                    let frame = controller.handle(Event::SourceSelected(sq));
                    println!("{}", frame.highlights.join(" "));
                    controller.handle(Event::DragCancelled);
                    continue;
                }
                Err(e) => {
                    println!("Bad square: {}", e);
                    continue;
                }
            },
            (Some("undo"), _) => Event::UndoRequested,
            (Some("reset"), _) => Event::ResetRequested,
            (Some("tutorial"), None) => Event::TutorialModeSelected,
            (Some("tutorial"), Some(id)) => Event::TutorialSelected(id.to_string()),
            (Some("game"), _) => Event::GameSelected,
            (Some(mv), _) => match mv.parse::<MoveProposal>() {
                Ok(mv) => Event::Propose(mv),
                Err(e) => {
                    println!("Bad move: {}", e);
                    continue;
                }
            },
        };

        let frame = controller.handle(event);
        println!();
        show(&frame);
    }
}
