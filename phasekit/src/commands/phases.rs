use anyhow::Result;
use phasekit_resolver::PhaseTable;

/// Print the phases `action` covers with their built-ins.
pub fn cmd_phases(action: &str, only: bool) -> Result<()> {
    let table = PhaseTable::standard();
    let phases = match table.index_of(action) {
        Some(i) if only => &table.phases()[i..=i],
        _ => table.phases_for(action),
    };
    if phases.is_empty() {
        println!("'{}' is not a lifecycle phase", action);
        return Ok(());
    }
    for phase in phases {
        println!("{}: {}", phase.name, phase.builtins.join(", "));
    }
    Ok(())
}
