use std::fmt;

use satchel_core::{InventorySettings, ItemCatalog, ItemKey, ItemStack};
use satchel_inventory::{AddOutcome, Inventory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn at_line(self, line: usize) -> Self {
        Self::new(format!("line {line}: {}", self.message))
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    Capacity {
        slots: usize,
    },
    Give {
        key: ItemKey,
        count: u32,
        max: Option<u32>,
    },
    Put {
        key: ItemKey,
        count: u32,
        max: u32,
        index: usize,
    },
    Remove {
        index: usize,
    },
    Swap {
        source: usize,
        target: usize,
    },
    Split {
        source: usize,
        target: usize,
        amount: u32,
    },
    Clear,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

/// Items and settings used to build records for `give`/`put`.
pub struct CommandContext<'a> {
    pub catalog: &'a ItemCatalog,
    pub settings: &'a InventorySettings,
}

impl CommandContext<'_> {
    /// Record from the catalog template when one exists, else a bare record.
    fn build_item(&self, key: &ItemKey, count: u32, max: Option<u32>) -> ItemStack {
        match self.catalog.instantiate(key, count, self.settings) {
            Some(mut item) => {
                if let Some(max) = max {
                    item.set_max_quantity(max);
                    item.set_quantity(count);
                }
                item
            }
            None => ItemStack::new(key.clone(), count, max.unwrap_or(1)),
        }
    }
}

pub fn execute_command(
    inv: &mut Inventory,
    ctx: &CommandContext<'_>,
    cmd: InventoryCommand,
) -> CommandOutput {
    let mut out = CommandOutput::default();
    match cmd {
        InventoryCommand::Capacity { slots } => {
            inv.set_capacity(slots);
            out.lines.push(format!("Capacity set to {}", inv.capacity()));
        }
        InventoryCommand::Give { key, count, max } => {
            let mut item = ctx.build_item(&key, count, max);
            let offered = item.quantity();
            let outcome = inv.add_item(&mut item);
            let given = offered - item.quantity();
            if given > 0 {
                out.lines.push(format!("Gave {given}× {key}"));
            }
            if outcome == AddOutcome::Rejected {
                out.lines
                    .push(format!("Inventory full; {}× not given", item.quantity()));
            }
        }
        InventoryCommand::Put {
            key,
            count,
            max,
            index,
        } => {
            let mut item = ctx.build_item(&key, count, Some(max));
            let offered = item.quantity();
            if inv.add_at_index(&mut item, index) {
                let placed = offered - item.quantity();
                out.lines
                    .push(format!("Put {placed}× {key} in slot {index}"));
            } else {
                out.lines
                    .push(format!("Error: slot {index} cannot take {key}"));
            }
        }
        InventoryCommand::Remove { index } => match inv.remove_at(index) {
            Some(item) => out.lines.push(format!(
                "Removed {}× {} from slot {index}",
                item.quantity(),
                item.key()
            )),
            None => out.lines.push(format!("Slot {index} is empty")),
        },
        InventoryCommand::Swap { source, target } => {
            if inv.swap(source, target) {
                out.lines
                    .push(format!("Swapped slots {source} and {target}"));
            } else {
                out.lines
                    .push(format!("Error: cannot swap slots {source} and {target}"));
            }
        }
        InventoryCommand::Split {
            source,
            target,
            amount,
        } => {
            if inv.split(source, target, amount) {
                out.lines
                    .push(format!("Moved {amount} from slot {source} to slot {target}"));
            } else {
                out.lines.push(format!(
                    "Error: cannot split {amount} from slot {source} to slot {target}"
                ));
            }
        }
        InventoryCommand::Clear => {
            let cleared = inv.occupied();
            inv.create_new();
            out.lines.push(format!("Cleared {cleared} slots"));
        }
    }
    out
}

/// Parse one script line. Blank lines and `#` comments yield `None`.
pub fn parse_command(input: &str) -> Result<Option<InventoryCommand>, CommandError> {
    let input = input.split('#').next().unwrap_or_default().trim();
    if input.is_empty() {
        return Ok(None);
    }

    let mut parts = input.split_whitespace();
    let cmd = parts
        .next()
        .ok_or_else(|| CommandError::new("Missing command"))?
        .to_ascii_lowercase();
    let args: Vec<&str> = parts.collect();

    let cmd = match cmd.as_str() {
        "capacity" => {
            if args.len() != 1 {
                return Err(CommandError::new("Usage: capacity <slots>"));
            }
            InventoryCommand::Capacity {
                slots: parse_index(args[0])?,
            }
        }
        "give" => {
            if !(2..=3).contains(&args.len()) {
                return Err(CommandError::new("Usage: give <item> <count> [max]"));
            }
            InventoryCommand::Give {
                key: parse_key(args[0])?,
                count: parse_count(args[1])?,
                max: args.get(2).map(|max| parse_count(max)).transpose()?,
            }
        }
        "put" => {
            if args.len() != 4 {
                return Err(CommandError::new("Usage: put <item> <count> <max> <slot>"));
            }
            InventoryCommand::Put {
                key: parse_key(args[0])?,
                count: parse_count(args[1])?,
                max: parse_count(args[2])?,
                index: parse_index(args[3])?,
            }
        }
        "remove" => {
            if args.len() != 1 {
                return Err(CommandError::new("Usage: remove <slot>"));
            }
            InventoryCommand::Remove {
                index: parse_index(args[0])?,
            }
        }
        "swap" => {
            if args.len() != 2 {
                return Err(CommandError::new("Usage: swap <from> <to>"));
            }
            InventoryCommand::Swap {
                source: parse_index(args[0])?,
                target: parse_index(args[1])?,
            }
        }
        "split" => {
            if args.len() != 3 {
                return Err(CommandError::new("Usage: split <from> <to> <amount>"));
            }
            InventoryCommand::Split {
                source: parse_index(args[0])?,
                target: parse_index(args[1])?,
                amount: parse_count(args[2])?,
            }
        }
        "clear" => {
            if !args.is_empty() {
                return Err(CommandError::new("Usage: clear"));
            }
            InventoryCommand::Clear
        }
        _ => return Err(CommandError::new(format!("Unknown command: {cmd}"))),
    };
    Ok(Some(cmd))
}

/// Parse a whole script, one command per line.
pub fn parse_script(script: &str) -> Result<Vec<InventoryCommand>, CommandError> {
    let mut commands = Vec::new();
    for (line_no, line) in script.lines().enumerate() {
        if let Some(cmd) = parse_command(line).map_err(|err| err.at_line(line_no + 1))? {
            commands.push(cmd);
        }
    }
    Ok(commands)
}

/// One line per slot: `[index] key quantity/max (name)` or `[index] -`.
pub fn render_slots(slots: &[Option<ItemStack>]) -> Vec<String> {
    slots
        .iter()
        .enumerate()
        .map(|(index, slot)| match slot {
            Some(item) if item.name.is_empty() => format!(
                "[{index}] {} {}/{}",
                item.key(),
                item.quantity(),
                item.max_quantity()
            ),
            Some(item) => format!(
                "[{index}] {} {}/{} ({})",
                item.key(),
                item.quantity(),
                item.max_quantity(),
                item.name
            ),
            None => format!("[{index}] -"),
        })
        .collect()
}

fn parse_key(s: &str) -> Result<ItemKey, CommandError> {
    ItemKey::parse(s).map_err(|err| CommandError::new(format!("Invalid item: {err}")))
}

fn parse_count(s: &str) -> Result<u32, CommandError> {
    match s.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(CommandError::new(format!("Invalid count: {s}"))),
    }
}

fn parse_index(s: &str) -> Result<usize, CommandError> {
    s.parse::<usize>()
        .map_err(|_| CommandError::new(format!("Invalid slot: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use satchel_core::{catalog_from_str, ItemCatalog};

    fn key(s: &str) -> ItemKey {
        ItemKey::parse(s).unwrap()
    }

    fn run(inv: &mut Inventory, catalog: &ItemCatalog, script: &str) -> Vec<String> {
        let settings = InventorySettings::default();
        let ctx = CommandContext {
            catalog,
            settings: &settings,
        };
        parse_script(script)
            .unwrap()
            .into_iter()
            .flat_map(|cmd| execute_command(inv, &ctx, cmd).lines)
            .collect()
    }

    #[test]
    fn parses_every_command() {
        assert_eq!(
            parse_command("give apple 5 10").unwrap(),
            Some(InventoryCommand::Give {
                key: key("apple"),
                count: 5,
                max: Some(10)
            })
        );
        assert_eq!(
            parse_command("PUT tools:pick 1 1 3").unwrap(),
            Some(InventoryCommand::Put {
                key: key("tools:pick"),
                count: 1,
                max: 1,
                index: 3
            })
        );
        assert_eq!(
            parse_command("split 0 1 4  # half").unwrap(),
            Some(InventoryCommand::Split {
                source: 0,
                target: 1,
                amount: 4
            })
        );
        assert_eq!(parse_command("   # only a comment").unwrap(), None);
        assert_eq!(parse_command("clear").unwrap(), Some(InventoryCommand::Clear));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_command("give apple 0").is_err());
        assert!(parse_command("give Apple! 1").is_err());
        assert!(parse_command("swap 1").is_err());
        assert!(parse_command("teleport 1 2 3").is_err());

        let err = parse_script("give apple 1\n\nremove x").unwrap_err();
        assert_eq!(err.to_string(), "line 3: Invalid slot: x");
    }

    #[test]
    fn catalog_templates_fill_in_details() {
        let catalog = catalog_from_str(
            r#"[{ "key": "apple", "name": "Apple", "max_quantity": 16 }]"#,
        )
        .unwrap();
        let mut inv = Inventory::new(2);
        let lines = run(&mut inv, &catalog, "give apple 20\ngive stone 3");

        assert_eq!(
            lines,
            vec!["Gave 16× satchel:apple", "Gave 1× satchel:stone"]
        );
        assert_eq!(
            render_slots(&inv.items()),
            vec!["[0] satchel:apple 16/16 (Apple)", "[1] satchel:stone 1/1"]
        );
    }

    #[test]
    fn golden_script_transcript_is_stable() {
        let catalog = ItemCatalog::default();
        let mut inv = Inventory::new(3);
        let transcript = run(
            &mut inv,
            &catalog,
            "\
# starting kit
give apple 6 10
give apple 6 10
put sword 1 1 2
split 0 1 3
swap 1 2
remove 1
give gem 1 1
give gem 1 1
capacity 4
clear
",
        );

        assert_eq!(
            transcript,
            vec![
                "Gave 6× satchel:apple",
                "Gave 6× satchel:apple",
                "Put 1× satchel:sword in slot 2",
                "Moved 3 from slot 0 to slot 1",
                "Swapped slots 1 and 2",
                "Removed 1× satchel:sword from slot 1",
                "Gave 1× satchel:gem",
                "Inventory full; 1× not given",
                "Capacity set to 4",
                "Cleared 3 slots",
            ]
        );
        assert!(inv.is_empty());
        assert_eq!(inv.len(), 4);
    }
}
