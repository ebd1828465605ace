use std::io::{self, BufRead, Write};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use catalog_core::FilterPatch;
use catalog_engine::{CatalogLoader, FileSessionStore, PostgrestGateway, SessionCache};
use catalog_logging::catalog_info;
use log::LevelFilter;

use super::commands::{self, Command};
use super::config::AppConfig;
use super::render;

const TICK: Duration = Duration::from_millis(75);

enum Input {
    Line(String),
    Closed,
}

pub fn run_app() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    catalog_logging::initialize(
        config.log_destination(),
        LevelFilter::Info,
        &config.log_file,
    );
    catalog_info!(
        "Starting catalog for {:?} against {}",
        config.list,
        config.api_url
    );

    let gateway = PostgrestGateway::new(config.gateway_settings())
        .context("creating the remote gateway")?;
    let cache = match &config.session_dir {
        Some(dir) => SessionCache::new(FileSessionStore::new(dir.clone())),
        None => SessionCache::in_memory(),
    };

    let mut loader = CatalogLoader::new(config.profile(), Arc::new(gateway), cache);
    loader.mount();

    let (input_tx, input_rx) = mpsc::channel::<Input>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(Input::Line(line)).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Closed);
    });

    let mut out = io::stdout();
    render::print_help(&mut out)?;

    loop {
        match input_rx.recv_timeout(TICK) {
            Ok(Input::Line(line)) => match commands::parse(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(Command::Help)) => render::print_help(&mut out)?,
                Ok(Some(command)) => apply(&mut loader, command),
                Ok(None) => {}
                Err(err) => writeln!(out, "{err}")?,
            },
            Ok(Input::Closed) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        loader.pump();
        if let Some(offset) = loader.take_scroll_restore() {
            writeln!(out, "(restored scroll position {offset})")?;
        }
        if loader.consume_dirty() {
            render::render(&mut out, &loader.view())?;
        }
    }

    catalog_info!("Catalog session closed");
    Ok(())
}

fn apply(loader: &mut CatalogLoader, command: Command) {
    match command {
        Command::More => loader.load_more(),
        Command::Scroll(metrics) => loader.on_scroll(metrics),
        Command::Search(text) => loader.set_search_query(text),
        Command::Category(value) => loader.set_filters(FilterPatch::category(value)),
        Command::Company(value) => loader.set_filters(FilterPatch::company(value)),
        Command::Saved(ids) => loader.set_filters(FilterPatch::saved_only(ids)),
        Command::Open(id) => loader.open_record(id),
        Command::Help | Command::Quit => {}
    }
}
