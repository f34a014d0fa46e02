//! Demo resources served (and advertised) by the example node.

pub mod button;
pub mod hello;
pub mod toggle;

use rd_node_sdk::ResourceTable;

pub use button::{ButtonCount, PressCounter};
pub use hello::Hello;
pub use toggle::{Led, Toggle};

/// The example node's resource table, in advertisement order.
pub fn default_table(led: &Led, presses: &PressCounter) -> ResourceTable {
    let mut table = ResourceTable::new();
    table
        .activate("test/hello", Some("title=\"Hello world: ?len=0..\";rt=\"Text\""), Hello)
        .activate(
            "actuators/toggle",
            Some("title=\"Red LED\";rt=\"Control\""),
            Toggle::new(led.clone()),
        )
        .activate(
            "sensors/button",
            Some("title=\"Button\";rt=\"Counter\""),
            ButtonCount::new(presses.clone()),
        );
    table
}
