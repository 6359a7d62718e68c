//! Shared test helpers for `cmdtree_core` integration tests.

#![allow(unreachable_pub)]

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use cmdtree_core::{
    CommandError, Dispatcher, IntegerParser, NodeBuilder, ParseResults, SimplePrincipal,
    StringParser,
};

/// A principal with no capabilities.
#[allow(dead_code)]
pub fn guest() -> Arc<SimplePrincipal> {
    Arc::new(SimplePrincipal::new("guest"))
}

/// A principal holding every capability.
#[allow(dead_code)]
pub fn operator() -> Arc<SimplePrincipal> {
    Arc::new(SimplePrincipal::operator("op"))
}

/// `give <item:word> <amount:int>`, executing to `amount`.
#[allow(dead_code)]
pub fn give_node() -> NodeBuilder<SimplePrincipal> {
    NodeBuilder::literal("give").then(
        NodeBuilder::argument("item", StringParser::word()).then(
            NodeBuilder::argument("amount", IntegerParser::new())
                .executes(|ctx| ctx.get::<i32>("amount")),
        ),
    )
}

/// A dispatcher holding only [`give_node`].
#[allow(dead_code)]
pub fn give_dispatcher() -> Dispatcher<SimplePrincipal> {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .register(give_node())
        .unwrap_or_else(|e| panic!("failed to register give: {e}"));
    dispatcher
}

/// A literal that returns `value` when executed.
#[allow(dead_code)]
pub fn returns(name: &str, value: i32) -> NodeBuilder<SimplePrincipal> {
    NodeBuilder::literal(name).executes(move |_| Ok(value))
}

/// Executor that counts its calls and returns 1.
#[allow(dead_code)]
pub fn counting(
    counter: &Arc<AtomicI32>,
) -> impl Fn(&cmdtree_core::CommandContext<'_, SimplePrincipal>) -> Result<i32, CommandError>
+ Send
+ Sync
+ 'static {
    let counter = Arc::clone(counter);
    move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}

/// Diagnostic codes of every recorded error, in order.
#[allow(dead_code)]
pub fn error_codes<S>(parse: &ParseResults<'_, S>) -> Vec<String> {
    parse.errors().iter().map(|(_, e)| e.id.to_string()).collect()
}

/// Names of the visited nodes of the outermost context.
#[allow(dead_code)]
pub fn visited<S>(dispatcher: &Dispatcher<S>, parse: &ParseResults<'_, S>) -> Vec<String> {
    parse
        .context()
        .nodes()
        .iter()
        .filter_map(|n| dispatcher.node(n.node).map(|node| node.name().to_string()))
        .collect()
}
