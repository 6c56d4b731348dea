// ============================================================================
// Feed Replay Example
// Replays recorded venue frames through book feeds and prints the books
// ============================================================================

use perp_feed::prelude::*;
use std::sync::Arc;

const AEVO_FRAMES: &[&str] = &[
    r#"{"id":1,"data":["orderbook:ETH-PERP"]}"#,
    r#"{"channel":"orderbook:ETH-PERP","data":{"type":"snapshot","instrument_name":"ETH-PERP",
        "bids":[["2000.5","1.2"],["2000","3"],["1999.5","4.75"]],
        "asks":[["2001","0.5"],["2001.5","2"],["2002","6"]],"last_updated":"1700000000000000001"}}"#,
    r#"{"channel":"orderbook:ETH-PERP","data":{"type":"update","instrument_name":"ETH-PERP",
        "bids":[["2000.5","0"],["2000.25","0.8"]],"asks":[["2001","1.1"]],"last_updated":"1700000000000000002"}}"#,
    r#"{"channel":"orderbook:ETH-PERP","data":{"type":"update","instrument_name":"ETH-PERP",
        "bids":[["1990","100"]],"asks":[],"last_updated":"1700000000000000002"}}"#,
    r#"{"channel":"orderbook:ETH-PERP","data":{"type":"update","bids":[["abc","1"]]}}"#,
];

const VERTEX_LIQUIDITY: &str = r#"{"status":"success","data":{
    "bids":[["1999000000000000000000","2500000000000000000"],["1998500000000000000000","1000000000000000000"]],
    "asks":[["2001500000000000000000","3000000000000000000"]],
    "timestamp":"1700000000000000000"}}"#;

const VERTEX_FRAMES: &[&str] = &[
    r#"{"type":"book_depth","min_timestamp":"1700000000000000100","max_timestamp":"1700000000000000200",
        "last_max_timestamp":"1700000000000000000","product_id":4,
        "bids":[["1999500000000000000000","750000000000000000"]],"asks":[["2001500000000000000000","0"]]}"#,
    r#"{"type":"book_depth","min_timestamp":"1700000000000000300","max_timestamp":"1700000000000000400",
        "last_max_timestamp":"1700000000000000200","product_id":4,
        "bids":[],"asks":[["2002000000000000000000","1250000000000000000"]]}"#,
];

fn replay(feed: &BookFeed, frames: &[&str]) {
    for frame in frames {
        if let Err(err) = feed.handle_frame(frame) {
            println!("  rejected: {}", err);
        }
    }
}

fn print_book(feed: &BookFeed) {
    let snapshot = feed.snapshot();
    println!("{}", snapshot);
    println!("Spread: {:?}", snapshot.spread.map(|s| s.to_string()));
    println!("Mid Price: {:?}", snapshot.mid_price.map(|m| m.to_string()));
    println!("Stats: {:?}", feed.stats());

    for side in [Side::Bid, Side::Ask] {
        if let Some(level) = feed.book().top(side) {
            println!(
                "Best {}: {} (after fees {})",
                side,
                level.price,
                level.net_price.to_fixed_string()
            );
        }
    }
}

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt::init();

    println!("=== Aevo ETH-PERP ===\n");

    let aevo = match create_feed(FeedConfig::aevo("ETH-PERP"), Arc::new(LoggingEventHandler)) {
        Ok(feed) => feed,
        Err(err) => {
            eprintln!("invalid Aevo configuration: {}", err);
            return;
        },
    };
    println!("Subscribe with: {}\n", aevo.subscribe_request(1));
    replay(&aevo, AEVO_FRAMES);
    print_book(&aevo);

    println!("\n=== Vertex product 4 ===\n");

    let vertex = match BookFeedBuilder::vertex(4)
        .with_display_depth(5)
        .build(Arc::new(LoggingEventHandler))
    {
        Ok(feed) => feed,
        Err(err) => {
            eprintln!("invalid Vertex configuration: {}", err);
            return;
        },
    };
    println!("Subscribe with: {}", vertex.subscribe_request(1));
    if let Some(query) = vertex.codec().snapshot_query() {
        println!("Bootstrap from: {}{}\n", vertex.config().http_url(), query);
    }
    if let Err(err) = vertex.handle_snapshot_body(VERTEX_LIQUIDITY) {
        eprintln!("bootstrap failed: {}", err);
        return;
    }
    replay(&vertex, VERTEX_FRAMES);
    print_book(&vertex);
}
