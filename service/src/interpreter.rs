//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Command interpreter seam

use crate::{Result, ShellSession};
use async_trait::async_trait;

/// Executes one complete input line on behalf of a shell session.
///
/// The worker calls [`CommandInterpreter::execute`] once per assembled line,
/// without the trailing newline. Output written through `session` goes to
/// its current sink. An error ends the connection.
///
/// # Example
///
/// ```no_run
/// use telshell_service::{CommandInterpreter, Result, ShellSession};
/// use async_trait::async_trait;
///
/// struct Echo;
///
/// #[async_trait]
/// impl CommandInterpreter for Echo {
///     async fn execute(&self, line: &str, session: &mut ShellSession) -> Result<()> {
///         if line == "exit" {
///             session.exit();
///         } else {
///             session.write_str(&format!("{line}\n")).await?;
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandInterpreter: Send + Sync + 'static {
    /// Execute `line` against `session`
    async fn execute(&self, line: &str, session: &mut ShellSession) -> Result<()>;
}
