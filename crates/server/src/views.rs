//! Conversions from engine records to wire DTOs.

use api_types::{
    Amount,
    friend::FriendView,
    transaction::{SplitView, TransactionView},
    user::UserView,
};
use engine::{Split, SplitDetail, TransactionDetail, User};
use upstream::MirrorFriend;

pub(crate) fn user_view(user: &User) -> UserView {
    UserView {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        avatar_url: user.avatar_url.clone(),
        google_id: user.google_id.clone(),
    }
}

pub(crate) fn friend_view(user: User) -> FriendView {
    FriendView {
        id: user.id,
        name: user.name,
        email: Some(user.email),
        avatar_url: user.avatar_url,
    }
}

pub(crate) fn mirror_friend_view(friend: MirrorFriend) -> FriendView {
    FriendView {
        id: format!("splitwise:{}", friend.id),
        name: friend.name,
        email: friend.email,
        avatar_url: friend.avatar_url,
    }
}

pub(crate) fn split_view(split: &Split) -> SplitView {
    SplitView {
        id: split.id,
        transaction_id: split.transaction_id,
        user_id: split.user_id.clone(),
        amount: Amount(split.amount_minor),
        user: None,
    }
}

fn split_detail_view(detail: &SplitDetail) -> SplitView {
    SplitView {
        user: Some(user_view(&detail.user)),
        ..split_view(&detail.split)
    }
}

pub(crate) fn transaction_view(detail: &TransactionDetail) -> TransactionView {
    let tx = &detail.transaction;
    TransactionView {
        id: tx.id,
        amount: Amount(tx.amount_minor),
        description: tx.description.clone(),
        date: tx.date,
        user_id: tx.user_id.clone(),
        issplit: tx.issplit,
        user: user_view(&detail.owner),
        splits: detail.splits.iter().map(split_detail_view).collect(),
    }
}
