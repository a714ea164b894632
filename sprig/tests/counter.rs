//! Counter component, end to end

// Imports
use {
	core::cell::Cell,
	sprig::{
		Block,
		Value,
		block,
		computed,
		container,
		element,
		mount,
		on_mounted,
		on_unmounted,
		reactive,
		record,
		run_microtasks,
		text,
		with_lifecycle,
	},
	std::rc::Rc,
};

#[test]
fn counter() {
	sprig_logger::init_test();

	let state = reactive(record! { count: 1 });
	let state = state.as_reactive().cloned().expect("Value wasn't observed");
	let doubled = computed({
		let state = state.clone();
		move || match state.get("count") {
			Value::Number(count) => count * 2.0,
			_ => f64::NAN,
		}
	});

	let mounted = Rc::new(Cell::new(false));
	let unmounted = Rc::new(Cell::new(false));
	let visible = reactive(record! { shown: true });
	let visible = visible.as_reactive().cloned().expect("Value wasn't observed");

	let root = container();
	mount(&root, || {
		let _: Block = block({
			let visible = visible.clone();
			let mounted = Rc::clone(&mounted);
			let unmounted = Rc::clone(&unmounted);
			let doubled = doubled.clone();
			move || {
				if visible.get("shown") != Value::Bool(true) {
					return;
				}

				with_lifecycle(|| {
					let mounted = Rc::clone(&mounted);
					on_mounted(move || mounted.set(true));
					let unmounted = Rc::clone(&unmounted);
					on_unmounted(move || unmounted.set(true));

					let doubled = doubled.clone();
					element("span", || {
						let _: Block = block(move || {
							text(doubled.get());
						});
					});
				});
			}
		});
	})
	.expect("Unable to mount");
	assert!(mounted.get());
	assert_eq!(
		root.to_html(),
		"<div><!--block--><!--scope--><span><!--block--><!--scope-->2<!--/block--></span><!--/block--></div>"
	);

	state.set("count", 5);
	run_microtasks().expect("Unable to flush");
	assert!(root.to_html().contains(">10<"), "Doubled count wasn't re-rendered");

	visible.set("shown", false);
	run_microtasks().expect("Unable to flush");
	assert!(unmounted.get(), "Component wasn't unmounted");
	assert_eq!(root.to_html(), "<div><!--block--><!--scope--><!--/block--></div>");
}
