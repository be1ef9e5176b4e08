//! Login and logout commands: USER, PASS, QUIT.

use log::{info, warn};

use super::required_parameter;
use crate::auth::{AuthTier, is_anonymous_name, validate_password, validate_user};
use crate::client::Session;
use crate::protocol::commands::CommandResult;
use crate::protocol::parser::parameter;
use crate::protocol::registry::CommandHandler;
use crate::protocol::responses::{
    BAD_SEQUENCE, CLOSING, LOGIN_SUCCESS, NOT_LOGGED_IN, PASSWORD_REQUIRED, format_response,
};

/// USER: records the username and asks for a password.
#[derive(Debug, Default)]
pub struct CmdUser;

impl CommandHandler for CmdUser {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        let username = match required_parameter(raw_line) {
            Ok(name) => name.trim(),
            Err(reply) => return reply,
        };

        if session.tier() != AuthTier::Unauthenticated {
            return CommandResult::failure(
                "Already logged in",
                format_response(NOT_LOGGED_IN, "Can't change user when logged in"),
            );
        }

        if is_anonymous_name(username) {
            if !session.context().config().allow_anonymous {
                session.set_user_valid(false);
                session.set_username(None);
                return CommandResult::failure(
                    "Anonymous login disabled",
                    format_response(NOT_LOGGED_IN, "Anonymous login not allowed"),
                );
            }
            session.set_user_valid(true);
            session.set_username(Some(username.to_string()));
            return CommandResult::success(format_response(
                PASSWORD_REQUIRED,
                "Guest login ok, send your e-mail address as password",
            ));
        }

        let context = session.context();
        let result = validate_user(
            username,
            context.credentials(),
            context.config().max_username_length,
        );
        match result {
            Ok(()) => {
                session.set_user_valid(true);
                session.set_username(Some(username.to_string()));
                CommandResult::success(format_response(
                    PASSWORD_REQUIRED,
                    &format!("Password required for {}", username),
                ))
            }
            Err(e) => {
                info!("USER rejected for {}: {}", session.peer(), e);
                session.set_user_valid(false);
                session.set_username(None);
                CommandResult::failure(e.to_string(), format_response(NOT_LOGGED_IN, "Invalid username"))
            }
        }
    }
}

/// PASS: checks the password and moves the session to its login tier.
#[derive(Debug, Default)]
pub struct CmdPass;

impl CommandHandler for CmdPass {
    fn run(&self, session: &mut Session, raw_line: &str) -> CommandResult {
        if session.tier() != AuthTier::Unauthenticated {
            return CommandResult::success(format_response(LOGIN_SUCCESS, "Already logged in"));
        }

        let username = match (session.is_user_valid(), session.username()) {
            (true, Some(name)) => name.to_string(),
            _ => {
                return CommandResult::failure(
                    "Username not provided",
                    format_response(BAD_SEQUENCE, "Login with USER first"),
                );
            }
        };
        let password = parameter(raw_line);

        if is_anonymous_name(&username) && session.context().config().allow_anonymous {
            session.set_tier(AuthTier::Anonymous);
            info!("Guest login from {}", session.peer());
            return CommandResult::success(format_response(
                LOGIN_SUCCESS,
                "Guest login ok, access restrictions apply",
            ));
        }

        let context = session.context();
        let result = validate_password(
            &username,
            password,
            context.credentials(),
            context.config().max_username_length,
        );
        match result {
            Ok(()) => {
                session.set_tier(AuthTier::Authenticated);
                info!("User {} logged in from {}", username, session.peer());
                CommandResult::success(format_response(LOGIN_SUCCESS, "Login successful"))
            }
            Err(e) => {
                warn!("Failed login for {} from {}: {}", username, session.peer(), e);
                session.set_user_valid(false);
                session.set_username(None);
                CommandResult::failure(e.to_string(), format_response(NOT_LOGGED_IN, "Login incorrect"))
            }
        }
    }
}

/// QUIT: logs out and closes the control connection.
#[derive(Debug, Default)]
pub struct CmdQuit;

impl CommandHandler for CmdQuit {
    fn run(&self, session: &mut Session, _raw_line: &str) -> CommandResult {
        info!("Client {} requested to quit", session.peer());
        session.logout();
        CommandResult::close(format_response(CLOSING, "Goodbye"))
    }
}
