/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use pardis_cli::init_env_logger;
use pardis_cli::main as cli_main;
use std::process::ExitCode;

pub fn main() -> ExitCode {
    // Initialize the logger
    if let Err(error) = init_env_logger() {
        eprintln!("{error:#}");
        return ExitCode::FAILURE;
    }
    // Call the main function of the CLI with cli args
    match cli_main(std::env::args_os()) {
        Ok(exit_code) => exit_code,
        Err(error) => {
            log::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}
