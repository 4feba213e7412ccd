use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use indicatif::ProgressBar;

use crate::api::client::{AgentBuilderClient, EventStream};
use crate::cli::flags::{ChatArgs, TaskArgs};
use crate::cli::InvokeCommands;
use crate::commands::helpers::{read_json_file, resolve_format};
use crate::config::Settings;
use crate::error::{AbError, Result};
use crate::models::invocation::{ChatMessage, InvokeRequest, InvokeResponse, InvokeTaskRequest};
use crate::output::{self, OutputFormat};

pub fn execute(command: &InvokeCommands, settings: &Settings) -> Result<()> {
    let mut client = AgentBuilderClient::new(settings.clone())?;

    match command {
        InvokeCommands::Chat(args) => chat(&mut client, settings, args),
        InvokeCommands::Task(args) => task(&mut client, settings, args),
        InvokeCommands::Interactive {
            agent_id,
            version_id,
        } => interactive(
            &mut client,
            agent_id,
            version_id.as_deref().unwrap_or("latest"),
        ),
    }
}

fn chat(client: &mut AgentBuilderClient, settings: &Settings, args: &ChatArgs) -> Result<()> {
    let message = resolve_message(args.message.as_deref(), args.message_file.as_deref())?;

    let mut request = InvokeRequest::from_messages(vec![ChatMessage::user(message)]);
    request.temperature = args.temperature;
    request.max_tokens = args.max_tokens;

    let version = args.version_id.as_deref().unwrap_or("latest");

    if args.stream {
        println!("Invoking agent {} with streaming...", args.agent_id);
        stream_events(client.invoke_agent_stream(&args.agent_id, version, &request)?)?;
        println!();
        println!("✓ Streaming complete");
        return Ok(());
    }

    let spinner = wait_spinner(format!("Invoking agent {}...", args.agent_id));
    let response = client.invoke_agent(&args.agent_id, version, &request);
    spinner.finish_and_clear();

    print_response(&response?, resolve_format(args.format.format, settings))
}

fn task(client: &mut AgentBuilderClient, settings: &Settings, args: &TaskArgs) -> Result<()> {
    let inputs = read_json_file(&args.file)?;
    let request = InvokeTaskRequest {
        inputs,
        temperature: None,
        max_tokens: None,
    };

    let version = args.version_id.as_deref().unwrap_or("latest");

    if args.stream {
        println!("Invoking task agent {} with streaming...", args.agent_id);
        stream_events(client.invoke_task_stream(&args.agent_id, version, &request)?)?;
        println!();
        println!("✓ Streaming complete");
        return Ok(());
    }

    let spinner = wait_spinner(format!("Invoking task agent {}...", args.agent_id));
    let response = client.invoke_task(&args.agent_id, version, &request);
    spinner.finish_and_clear();

    print_response(&response?, resolve_format(args.format.format, settings))
}

/// REPL holding the conversation history. `exit`/`quit` (or EOF) leave,
/// `clear` resets the history; responses stream as they are generated.
/// Failed turns are reported and the session continues.
fn interactive(client: &mut AgentBuilderClient, agent_id: &str, version_id: &str) -> Result<()> {
    // Verify the agent exists before starting the session.
    let existing = client.get_agent(agent_id, Some(version_id))?;

    println!("Interactive session with {}", existing.agent.name);
    println!("Type 'exit' or 'quit' to end, 'clear' to reset history");
    println!();

    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            println!("Session ended.");
            return Ok(());
        }
        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Session ended.");
            return Ok(());
        }
        if input.eq_ignore_ascii_case("clear") {
            history.clear();
            println!("Conversation history cleared.");
            continue;
        }
        if input.is_empty() {
            continue;
        }

        history.push(ChatMessage::user(input));
        let request = InvokeRequest::from_messages(history.clone());

        print!("Agent: ");
        io::stdout().flush()?;

        match client
            .invoke_agent_stream(agent_id, version_id, &request)
            .and_then(stream_events)
        {
            Ok(reply) => {
                println!();
                if !reply.is_empty() {
                    history.push(ChatMessage::assistant(reply));
                }
            }
            Err(err) => {
                println!();
                eprintln!("Error: {}", err);
            }
        }
    }
}

fn resolve_message(message: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (message, file) {
        (Some(text), _) => Ok(text.to_string()),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|err| AbError::Config(format!("cannot read {}: {}", path.display(), err))),
        (None, None) => Err(AbError::InvalidRequest(
            "no message provided; use --message or --message-file".to_string(),
        )),
    }
}

/// Print `text` events as they arrive and return the concatenated text.
/// An `error` event aborts with its message; unknown event types are
/// ignored.
fn stream_events(stream: EventStream) -> Result<String> {
    let mut collected = String::new();

    for event in stream {
        let event = event?;
        match event.event.as_str() {
            "text" => {
                if let Some(data) = &event.data {
                    print!("{}", data);
                    io::stdout().flush()?;
                    collected.push_str(data);
                }
            }
            "error" => {
                let message = event
                    .data
                    .unwrap_or_else(|| "unknown stream error".to_string());
                return Err(AbError::Stream(message));
            }
            _ => {}
        }
    }
    Ok(collected)
}

fn print_response(response: &InvokeResponse, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => output::print_json(response),
        OutputFormat::Yaml => output::print_yaml(response),
        OutputFormat::Table => {
            println!();
            println!("Response:");
            match response.message_text() {
                Some(text) => println!("{}", text),
                None => println!("(no response text)"),
            }
            println!();

            if let Some(usage) = &response.usage {
                println!("Token usage:");
                for (key, value) in usage {
                    println!("  {}: {}", key, value);
                }
            }
            if let Some(reason) = &response.finish_reason {
                println!("Finish reason: {}", reason);
            }
            Ok(())
        }
    }
}

fn wait_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
