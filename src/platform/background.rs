//! Background entry point: relays tab URL changes to the tab's content
//! script so it can re-check a page the observer may have missed.

use tracing::{info, trace};
use wasm_bindgen::prelude::*;

use super::{chrome, logging};
use crate::services::messages::notice_for_tab_update;

#[wasm_bindgen(js_name = runBackground)]
pub fn run_background() {
    logging::init();

    chrome::on_tab_updated(|tab_id, change_info| {
        let url = change_info.get("url").and_then(|url| url.as_str());
        let Some(notice) = notice_for_tab_update(url) else {
            return;
        };
        trace!("Tab {} navigated to {}", tab_id, notice.new_url);
        chrome::send_notice(tab_id, &notice);
    });

    info!("Background relay ready");
}
