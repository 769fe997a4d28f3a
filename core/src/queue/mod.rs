/// Suppose several threads enqueue into a list of nodes whose first node is a dummy. An enqueuer
/// that finds the tail node already has a successor does not wait for the thread that linked it:
///
/// 1. Swing `tail` to the successor on that thread's behalf.
/// 2. Start over from the new tail.
/// 3. Link its own node with a CAS on `tail.next`, then try to swing `tail` once.
///
/// Dequeuers help a lagging tail the same way before they advance `head`.
///
/// # Examples
///
/// ```
/// use simple_lockfree_core::queue::michael_scott::MsQueue;
///
/// let queue = MsQueue::new();
/// queue.enqueue(1);
/// queue.enqueue(2);
/// queue.enqueue(3);
/// assert_eq!(queue.head(), Some(1));
/// assert_eq!(queue.dequeue(), Some(1));
/// assert_eq!(queue.dequeue(), Some(2));
/// assert!(!queue.is_empty());
/// assert_eq!(queue.dequeue(), Some(3));
/// assert_eq!(queue.dequeue(), None);
/// assert!(queue.is_empty());
/// ```
pub mod michael_scott;

/// Enqueue swaps `tail` to the new node and only then links the old tail to it, so an enqueue
/// never retries. The price is paid by a dequeuer that takes the last linked node while such an
/// enqueue is in flight: it spins until the link appears.
///
/// # Examples
///
/// ```
/// use simple_lockfree_core::queue::two_pointer::TwoPointerQueue;
///
/// let queue = TwoPointerQueue::new();
/// assert!(queue.is_empty());
/// queue.enqueue("a");
/// queue.enqueue("b");
/// assert_eq!(queue.head(), Some("a"));
/// assert_eq!(queue.dequeue(), Some("a"));
/// assert_eq!(queue.dequeue(), Some("b"));
/// assert_eq!(queue.dequeue(), None);
/// ```
pub mod two_pointer;
