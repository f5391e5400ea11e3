//! Runs interaction commands against the record store.

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use log::debug;

use super::interaction::{Command, Event, InteractionState, transition};
use crate::api::UserApi;
use crate::error::Error;
use crate::store::RecordStore;

pub struct InteractionController<A> {
	store: RecordStore<A>,
	state: Rc<RefCell<InteractionState>>,
	listeners: Rc<RefCell<Vec<Rc<dyn Fn()>>>>,
}

impl<A> Clone for InteractionController<A> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			state: self.state.clone(),
			listeners: self.listeners.clone(),
		}
	}
}

impl<A: UserApi + 'static> InteractionController<A> {
	pub fn new(store: RecordStore<A>) -> Self {
		Self {
			store,
			state: Rc::new(RefCell::new(InteractionState::default())),
			listeners: Rc::new(RefCell::new(Vec::new())),
		}
	}

	pub fn store(&self) -> &RecordStore<A> {
		&self.store
	}

	pub fn state(&self) -> InteractionState {
		self.state.borrow().clone()
	}

	/// Registers a callback run after every interaction state change.
	pub fn subscribe(&self, listener: impl Fn() + 'static) {
		self.listeners.borrow_mut().push(Rc::new(listener));
	}

	fn notify(&self) {
		let listeners: Vec<_> = self.listeners.borrow().clone();
		for listener in listeners {
			listener();
		}
	}

	/// Applies `event` immediately and returns the remote work it started.
	///
	/// The state transition and any provisional edge are visible as soon as this
	/// returns; the future resolves once the backend has answered. Dropping the
	/// future skips the remote calls and leaves any provisional edge drawn.
	pub fn dispatch(&self, event: Event) -> impl Future<Output = Result<(), Error>> + use<A> {
		debug!("interaction event {event:?}");
		let records = self.store.records();
		let step = transition(&self.state.borrow(), event, &records);
		let changed = *self.state.borrow() != step.state;
		*self.state.borrow_mut() = step.state;
		if changed {
			self.notify();
		}

		let mut rejected = None;
		let mut pending = None;
		let mut remote = Vec::new();
		for command in step.commands {
			match command {
				Command::ShowProvisionalEdge { source, target } => {
					pending = Some(self.store.add_provisional_link(&source, &target));
				}
				Command::Reject(err) => {
					debug!("rejected locally: {err}");
					self.store.report_error(err.to_string());
					rejected.get_or_insert(Error::from(err));
				}
				Command::CreateFriendship { provisional: true, .. } => {
					remote.push((command, pending.take()));
				}
				other => remote.push((other, None)),
			}
		}

		let this = self.clone();
		async move {
			for (command, pending) in remote {
				this.run(command, pending).await?;
			}
			match rejected {
				Some(err) => Err(err),
				None => Ok(()),
			}
		}
	}

	/// `pending` is the provisional link drawn for a gesture-created friendship.
	async fn run(&self, command: Command, pending: Option<u64>) -> Result<(), Error> {
		match command {
			Command::CreateFriendship { source, target, .. } => match pending {
				Some(id) => self.store.link_provisional(id, &source, &target).await,
				None => self.store.link_users(&source, &target).await,
			},
			Command::AssignAttribute {
				user_id,
				username,
				value,
				update,
			} => {
				self.store.update_user(&user_id, &update).await?;
				self.store
					.report_success(format!("Added \"{value}\" to {username}"));
				Ok(())
			}
			Command::ShowProvisionalEdge { .. } | Command::Reject(_) => Ok(()),
		}
	}
}
