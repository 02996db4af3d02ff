//! Core layer: conversion features and session-owned history

pub mod features;
pub mod history;
