// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod cli;
mod columns;
mod config;
mod console_format;
mod dates;
mod error;
mod fetch;
mod filter;
mod report;
mod session;
mod sheet;
mod table;
mod types;
mod ui;
mod urls;

use config::ReportConfig;
use error::AppError;
use fetch::HttpImageSource;
use filter::DateRange;
use session::Session;
use ui::{Severity, StatusBanner};

fn main() {
    env_logger::init();

    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Set console width override if specified (for testing)
    if let Some(width) = args.console_width {
        console_format::set_console_width(width);
    }

    let config = match config::build_report_config(&args) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    let mut banner = StatusBanner::default();
    if let Err(e) = run(&args, &config, &mut banner) {
        banner.notify(e.notice());
    }

    // Warnings count as failures: they mean no report was produced
    let exit_code = if banner.worst() >= Some(Severity::Warning) { 1 } else { 0 };
    std::process::exit(exit_code);
}

/// Load, filter, show and export in the order the user would click through them
fn run(args: &cli::CliArgs, config: &ReportConfig, banner: &mut StatusBanner) -> Result<(), AppError> {
    let mut session = Session::new();
    banner.notify(session.load(args.input.as_deref())?);

    if args.has_date_filter() {
        let range = DateRange::new(args.start, args.end);
        banner.notify(session.apply_filter(&range, config)?);
    }

    if !args.no_table
        && let Some(table) = session.table(config)
    {
        console_format::print_table(&table);
    }

    if let Some(ref path) = args.json {
        banner.notify(session.export_json(path, config)?);
    }

    if !args.no_pdf {
        ui::status("Generating PDF... this may take a while depending on the number of images.");
        let mut source = HttpImageSource::from_config(&config.images);
        banner.notify(session.generate_report(&mut source, config)?);
    }

    Ok(())
}
