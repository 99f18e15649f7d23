//! Plan manager sign-in and collaborator commands

use clap::{Args, Subcommand};

use super::Session;

/// Team commands
#[derive(Args, Debug)]
pub struct TeamArgs {
    #[command(subcommand)]
    pub command: TeamCommand,
}

#[derive(Subcommand, Debug)]
pub enum TeamCommand {
    /// Sign in as the plan manager
    Signin {
        /// Display name
        name: String,

        /// Email address
        email: String,
    },

    /// Invite a collaborator as a viewer
    Invite {
        /// Email address
        email: String,
    },

    /// List collaborators
    List,
}

impl TeamArgs {
    pub async fn execute(&self, session: &Session, verbose: bool) -> anyhow::Result<()> {
        let persistence = session.persistence();
        match &self.command {
            TeamCommand::Signin { name, email } => {
                let profile = persistence.sign_in(name, email).await?;
                println!("Signed in as {} <{}>", profile.name, profile.email);
            }
            TeamCommand::Invite { email } => {
                let mut roster = persistence.load_roster().await?;
                let invited = roster.invite(email)?.clone();
                persistence.save_roster(&roster).await?;
                println!("Invited {} <{}> as {}", invited.name, invited.email, invited.role);
            }
            TeamCommand::List => {
                let roster = persistence.load_roster().await?;
                if roster.collaborators().is_empty() {
                    println!("No collaborators. Use 'pmplan team signin' to start.");
                    return Ok(());
                }
                for collaborator in roster.collaborators() {
                    println!(
                        "  {:<8} {} <{}>",
                        collaborator.role.to_string(),
                        collaborator.name,
                        collaborator.email
                    );
                    if verbose {
                        println!("           {}", collaborator.id);
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(subcommand)]
        command: TeamCommand,
    }

    #[test]
    fn test_parse_signin() {
        let cli =
            TestCli::try_parse_from(["pmplan", "signin", "Alice", "alice@example.com"]).unwrap();
        assert!(matches!(
            cli.command,
            TeamCommand::Signin { ref name, ref email }
                if name == "Alice" && email == "alice@example.com"
        ));
    }

    #[test]
    fn test_parse_invite_requires_email() {
        assert!(TestCli::try_parse_from(["pmplan", "invite"]).is_err());
        let cli = TestCli::try_parse_from(["pmplan", "invite", "carol@example.com"]).unwrap();
        assert!(matches!(cli.command, TeamCommand::Invite { .. }));
    }
}
