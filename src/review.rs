//! Line-driven correction of the reject queue within one run.

use dealership_inventory::app::InventoryContext;
use dealership_inventory::inventory::{Field, InventoryError, RejectHandle, RejectedRecord};
use std::io::{self, BufRead, Write};

const HELP: &str = "\
commands:
  list                          show queued rejects
  edit <handle> <field> [value] set a field; no value clears it
  resubmit <handle>|all         run a corrected record through ingestion again
  discard <handle>              drop a reject
  help                          show this text
  done                          stop reviewing";

#[derive(Debug, PartialEq, Eq)]
enum ReviewCommand {
    List,
    Edit {
        handle: RejectHandle,
        field: Field,
        value: String,
    },
    Resubmit(RejectHandle),
    ResubmitAll,
    Discard(RejectHandle),
    Help,
    Done,
}

impl ReviewCommand {
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "list" | "ls" => Self::List,
            "edit" => {
                let handle = handle(words.next())?;
                let key = words.next().ok_or("edit needs a field name")?;
                let field =
                    Field::from_key(key).ok_or_else(|| format!("unknown field '{key}'"))?;
                Self::Edit {
                    handle,
                    field,
                    value: words.collect::<Vec<_>>().join(" "),
                }
            }
            "resubmit" => match words.next() {
                Some(word) if word.eq_ignore_ascii_case("all") => Self::ResubmitAll,
                other => Self::Resubmit(handle(other)?),
            },
            "discard" | "drop" => Self::Discard(handle(words.next())?),
            "help" | "?" => Self::Help,
            "done" | "quit" | "exit" => Self::Done,
            other => return Err(format!("unknown command '{other}'; try help")),
        };
        Ok(Some(command))
    }
}

fn handle(word: Option<&str>) -> Result<RejectHandle, String> {
    word.ok_or_else(|| "a reject handle such as #1 is required".to_string())?
        .parse()
        .map_err(|err: InventoryError| err.to_string())
}

/// Reads commands from `input` until `done`, end of input, or an empty queue.
pub(crate) fn run<R: BufRead, W: Write>(
    context: &mut InventoryContext,
    mut input: R,
    output: &mut W,
) -> io::Result<()> {
    if context.rejects().is_empty() {
        writeln!(output, "No rejected records to review")?;
        return Ok(());
    }

    writeln!(output, "{HELP}")?;
    list(context, output)?;

    let mut line = String::new();
    loop {
        write!(output, "reject> ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let command = match ReviewCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "{message}")?;
                continue;
            }
        };

        if command == ReviewCommand::Done {
            break;
        }
        apply(context, command, output)?;

        if context.rejects().is_empty() {
            writeln!(output, "All rejects resolved")?;
            return Ok(());
        }
    }

    let left = context.rejects().len();
    if left > 0 {
        writeln!(
            output,
            "{left} rejects left unresolved; they are not kept after this run"
        )?;
    }
    Ok(())
}

fn apply<W: Write>(
    context: &mut InventoryContext,
    command: ReviewCommand,
    output: &mut W,
) -> io::Result<()> {
    match command {
        ReviewCommand::List => list(context, output),
        ReviewCommand::Edit {
            handle,
            field,
            value,
        } => match context.edit_reject(handle, field, &value) {
            Ok(()) if value.is_empty() => writeln!(output, "{handle} {} cleared", field.key()),
            Ok(()) => writeln!(output, "{handle} {} set to {value}", field.key()),
            Err(err) => writeln!(output, "error: {err}"),
        },
        ReviewCommand::Resubmit(handle) => match context.resubmit_reject(handle) {
            Ok(channel) => writeln!(
                output,
                "{handle} added to the {} inventory",
                channel.label()
            ),
            Err(err) => writeln!(output, "{handle} still rejected: {err}"),
        },
        ReviewCommand::ResubmitAll => match context.resubmit_all_rejects() {
            Ok(summary) => writeln!(
                output,
                "{} applied, {} still rejected",
                summary.applied, summary.still_rejected
            ),
            Err(err) => writeln!(output, "error: {err}"),
        },
        ReviewCommand::Discard(handle) => match context.discard_reject(handle) {
            Some(_) => writeln!(output, "{handle} discarded"),
            None => writeln!(output, "no reject {handle}"),
        },
        ReviewCommand::Help => writeln!(output, "{HELP}"),
        ReviewCommand::Done => Ok(()),
    }
}

fn list<W: Write>(context: &InventoryContext, output: &mut W) -> io::Result<()> {
    for entry in context.rejects().iter() {
        write_entry(entry, output)?;
    }
    Ok(())
}

fn write_entry<W: Write>(entry: &RejectedRecord, output: &mut W) -> io::Result<()> {
    match entry.reason() {
        Some(reason) => writeln!(
            output,
            "{} [{} {}] {reason}",
            entry.handle,
            reason.kind().label(),
            reason.code()
        )?,
        None => writeln!(output, "{} rejected without a recorded reason", entry.handle)?,
    }

    let fields: Vec<String> = entry
        .record
        .iter()
        .filter(|(field, _)| *field != Field::ErrorReason)
        .map(|(field, value)| format!("{}={}", field.key(), value.display_text()))
        .collect();
    writeln!(output, "    {}", fields.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealership_inventory::inventory::TransferMode;
    use std::fs;
    use std::io::Cursor;

    fn context_with_rejects(dir: &tempfile::TempDir) -> InventoryContext {
        let delivery = dir.path().join("delivery.csv");
        fs::write(
            &delivery,
            "dealership_id,vehicle_id,vehicle_type,vehicle_model,price\n\
D1,V1,suv,X,20000\n\
D1,V2,sedan,Y,cheap\n\
D1,V3,spaceship,Z,1000\n",
        )
        .expect("csv written");

        let mut context =
            InventoryContext::new(dir.path().join("inventory.json"), TransferMode::NoRollback);
        context.add_dealership("D1", "Downtown").expect("D1 added");
        let outcome = context.import(&delivery).expect("import runs");
        assert_eq!(outcome.rejected.len(), 2);
        context
    }

    fn review(context: &mut InventoryContext, script: &str) -> String {
        let mut output = Vec::new();
        run(context, Cursor::new(script), &mut output).expect("review runs");
        String::from_utf8(output).expect("utf-8 output")
    }

    #[test]
    fn commands_parse_handles_fields_and_values() {
        assert_eq!(
            ReviewCommand::parse("edit #2 vehicle_model Model S"),
            Ok(Some(ReviewCommand::Edit {
                handle: RejectHandle(2),
                field: Field::VehicleModel,
                value: "Model S".to_string(),
            }))
        );
        assert_eq!(
            ReviewCommand::parse("RESUBMIT all"),
            Ok(Some(ReviewCommand::ResubmitAll))
        );
        assert_eq!(ReviewCommand::parse("   "), Ok(None));
        assert!(ReviewCommand::parse("edit #1 colour red").is_err());
        assert!(ReviewCommand::parse("discard").is_err());
        assert!(ReviewCommand::parse("launch").is_err());
    }

    #[test]
    fn corrected_reject_is_resubmitted_and_saved() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut context = context_with_rejects(&dir);

        let transcript = review(
            &mut context,
            "edit #1 price 15000\nresubmit #1\ndiscard #2\n",
        );

        assert!(transcript.contains("#1 price set to 15000"));
        assert!(transcript.contains("#1 added to the sales inventory"));
        assert!(transcript.contains("#2 discarded"));
        assert!(transcript.contains("All rejects resolved"));

        let dealership = context.company().dealership("D1").expect("D1");
        assert!(dealership.contains_vehicle_id("V2"));
        assert!(!dealership.contains_vehicle_id("V3"));

        let mut reloaded =
            InventoryContext::new(context.inventory_path(), TransferMode::NoRollback);
        reloaded.load().expect("reloads");
        assert_eq!(reloaded.company().dealership("D1").expect("D1").inventory_len(), 2);
    }

    #[test]
    fn failed_resubmission_stays_queued_until_input_ends() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut context = context_with_rejects(&dir);

        let transcript = review(&mut context, "resubmit #2\nbogus\n");

        assert!(transcript.contains("#2 still rejected"));
        assert!(transcript.contains("unknown command 'bogus'"));
        assert!(transcript.contains("2 rejects left unresolved"));
        assert_eq!(context.rejects().len(), 2);
    }

    #[test]
    fn empty_queue_has_nothing_to_review() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut context =
            InventoryContext::new(dir.path().join("inventory.json"), TransferMode::NoRollback);
        assert_eq!(review(&mut context, "list\n"), "No rejected records to review\n");
    }
}
