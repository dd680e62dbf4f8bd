use activity_signup::{
    ActivityClient, ClientConfig, Dialogs, DirectoryApi, FileSessionStore, HttpDirectory,
    SessionStore,
    cli::{Command, HELP, is_yes, parse_command},
    ui::{render_text, save_page},
};
use std::{io::BufRead, sync::Arc, thread};
use tokio::sync::{Mutex, mpsc};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

type Input = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Alerts go to stdout; confirms read their answer from the same input stream as commands.
struct TerminalDialogs {
    input: Input,
}

impl Dialogs for TerminalDialogs {
    fn alert(&self, text: &str) {
        println!("! {text}");
    }

    async fn confirm(&self, text: &str) -> bool {
        println!("{text} [y/N]");
        match self.input.lock().await.recv().await {
            Some(answer) => is_yes(&answer),
            None => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    info!(
        api = %config.api_url,
        session = %config.session_path.display(),
        "starting activity client"
    );

    let input: Input = Arc::new(Mutex::new(spawn_input_reader()));
    let mut client = ActivityClient::new(
        HttpDirectory::new(config.api_url.clone()),
        FileSessionStore::new(config.session_path.clone()),
        TerminalDialogs {
            input: Arc::clone(&input),
        },
    );

    client.start().await;
    print_page(&client).await;
    println!("Type `help` for commands.");

    loop {
        let line = tokio::select! {
            line = next_line(&input) => line,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        };
        let Some(line) = line else {
            break;
        };

        match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(Command::Help)) => {
                println!("{HELP}");
                continue;
            }
            Ok(Some(Command::Show)) => {}
            Ok(Some(Command::SavePage(path))) => {
                match save_page(&path, &client.snapshot().await).await {
                    Ok(()) => println!("Wrote page to {}", path.display()),
                    Err(err) => {
                        error!("failed to write page: {err}");
                        println!("Could not write page to {}", path.display());
                    }
                }
                continue;
            }
            Ok(Some(Command::Logout)) => client.logout().await,
            Ok(Some(Command::Event(event))) => client.handle(event).await,
            Err(usage) => {
                println!("{usage}");
                continue;
            }
        }
        print_page(&client).await;
    }

    Ok(())
}

/// Stdin is read on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_input_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn next_line(input: &Input) -> Option<String> {
    input.lock().await.recv().await
}

async fn print_page<A, S, D>(client: &ActivityClient<A, S, D>)
where
    A: DirectoryApi,
    S: SessionStore,
    D: Dialogs,
{
    println!("{}", render_text(&client.snapshot().await));
}
