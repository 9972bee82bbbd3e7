// Commands module - one file per command
pub mod dm_test;
pub mod feedback;
pub mod hello;
pub mod joined;
pub mod message_history;
pub mod ping;
pub mod shutdown;

pub use dm_test::dm_test;
pub use feedback::test_modal;
pub use hello::hello;
pub use joined::{date_joined, show_join_date};
pub use message_history::message_history_test;
pub use ping::ping;
pub use shutdown::shutdown;

use crate::{Data, Error};

/// A command the bot can register, and whether it only belongs on test deployments.
pub struct CommandSpec {
    pub build: fn() -> poise::Command<Data, Error>,
    pub test_only: bool,
}

impl CommandSpec {
    const fn public(build: fn() -> poise::Command<Data, Error>) -> Self {
        Self { build, test_only: false }
    }

    const fn testing(build: fn() -> poise::Command<Data, Error>) -> Self {
        Self { build, test_only: true }
    }
}

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec::public(hello),
    CommandSpec::public(date_joined),
    CommandSpec::public(show_join_date),
    CommandSpec::public(ping),
    CommandSpec::public(shutdown),
    CommandSpec::testing(dm_test),
    CommandSpec::testing(message_history_test),
    CommandSpec::testing(test_modal),
];

/// Build the commands to register, leaving out test commands on production deployments.
pub fn enabled_commands(testing: bool) -> Vec<poise::Command<Data, Error>> {
    COMMANDS
        .iter()
        .filter(|spec| testing || !spec.test_only)
        .map(|spec| (spec.build)())
        .collect()
}
